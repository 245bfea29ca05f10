//! Reporting utilities: receipt itemization and spending tables.

pub mod format;

pub use format::*;
