//! Vendors command - list configured vendors.

use anyhow::Result;
use counterhub_core::VendorDirectory;
use counterhub_store::JsonVendorDirectory;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the vendors command.
pub async fn run(cli: &Cli) -> Result<()> {
    let directory = JsonVendorDirectory::load_default();
    let vendors = directory.read(None).await?;
    info!(count = vendors.len(), "Listing vendors");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            if vendors.is_empty() {
                println!("No vendors configured in {}", directory.path().display());
                return Ok(());
            }

            println!("{}", formatter.format_vendors_header());
            println!("{}", "─".repeat(60));
            for vendor in &vendors {
                println!("{}", formatter.format_vendor_line(vendor));
            }
            println!();
            println!("Total: {} vendors", vendors.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_vendors(&vendors)?);
        }
    }

    Ok(())
}
