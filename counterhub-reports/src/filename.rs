//! Output path naming.

use counterhub_core::{
    MonthRange, ProtocolVersion, ReportDefinition, path_component, vendor_dir_name,
};
use std::path::PathBuf;

/// File extension for report output.
pub const REPORT_EXTENSION: &str = "tsv";

/// Builds relative output paths for report files.
///
/// Paths are `{startYear}/{vendor-dir}/{vendor}_{report}_{release}_{YYYYMM}-{YYYYMM}.tsv`.
/// The same inputs always give the same path, so a rerun overwrites its
/// earlier output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameComposer;

impl FilenameComposer {
    /// Composes the relative path for one report file.
    pub fn compose(
        vendor_name: &str,
        definition: &ReportDefinition,
        version: ProtocolVersion,
        range: MonthRange,
    ) -> PathBuf {
        let file_name = format!(
            "{}_{}_{}_{}-{}.{REPORT_EXTENSION}",
            path_component(vendor_name),
            definition.file_token(),
            version.file_token(),
            range.begin.compact(),
            range.end.compact(),
        );
        PathBuf::from(range.begin.year().to_string())
            .join(Self::vendor_dir(vendor_name))
            .join(file_name)
    }

    /// Directory name for a vendor: spaces become dashes.
    pub fn vendor_dir(vendor_name: &str) -> String {
        vendor_dir_name(vendor_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Component, Path};

    fn range(begin: &str, end: &str) -> MonthRange {
        MonthRange::new(begin.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_compose_standard() {
        let path = FilenameComposer::compose(
            "Acme Press",
            &ReportDefinition::new("TR_J1", "Journal Requests"),
            ProtocolVersion::Current,
            range("2023-01", "2023-12"),
        );
        assert_eq!(
            path,
            Path::new("2023/Acme-Press/Acme Press_TR_J1_5_1_202301-202312.tsv")
        );
    }

    #[test]
    fn test_compose_custom_legacy_across_years() {
        let path = FilenameComposer::compose(
            "Beta",
            &ReportDefinition::new("tr", "Custom TR"),
            ProtocolVersion::Legacy,
            range("2022-11", "2023-02"),
        );
        assert_eq!(path, Path::new("2022/Beta/Beta_TR_custom-tr_5_202211-202302.tsv"));
    }

    #[test]
    fn test_deterministic() {
        let def = ReportDefinition::new("PR", "Platform Master Report");
        let r = range("2023-01", "2023-03");
        assert_eq!(
            FilenameComposer::compose("V", &def, ProtocolVersion::Current, r),
            FilenameComposer::compose("V", &def, ProtocolVersion::Current, r)
        );
    }

    #[test]
    fn test_vendor_name_cannot_escape_output_root() {
        let def = ReportDefinition::new("PR", "Platform Master Report");
        let r = range("2023-01", "2023-03");

        for name in ["../../etc", "..", "a/b\\c", "  ", "C:evil"] {
            let path = FilenameComposer::compose(name, &def, ProtocolVersion::Current, r);
            assert!(
                path.components().all(|c| matches!(c, Component::Normal(_))),
                "{name:?} gave {path:?}"
            );
            assert_eq!(path.components().count(), 3, "{name:?} gave {path:?}");
        }

        let path = FilenameComposer::compose("../../etc", &def, ProtocolVersion::Current, r);
        assert_eq!(path, Path::new("2023/.._.._etc/.._.._etc_PR_5_1_202301-202303.tsv"));
        assert_eq!(FilenameComposer::vendor_dir(".."), "_..");
    }
}
