//! Release 5.1 report bodies.
//!
//! Release 5.1 groups usage into attribute-performance blocks holding
//! `metric -> {"YYYY-MM" -> count}` maps. Item reports nest one more level:
//! a parent title carries several sub-items, each with its own blocks.

mod parser;

pub use parser::parse_current_report;
