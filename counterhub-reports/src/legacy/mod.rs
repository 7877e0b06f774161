//! Release 5 report bodies.
//!
//! Release 5 payloads are already item / performance / instance shaped.
//! Header identity lists may arrive as pair arrays or as objects and are
//! flattened into name/value pairs.

mod parser;

pub use parser::parse_legacy_report;
