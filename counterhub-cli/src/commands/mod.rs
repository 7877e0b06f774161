//! CLI command implementations.

pub mod config;
pub mod harvest;
pub mod reports;
pub mod vendors;
