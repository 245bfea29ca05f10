//! Input/output helpers.
//!
//! - receipt records JSON read/write (`records`)
//! - spending series CSV export (`export`)

pub mod export;
pub mod records;

pub use export::*;
pub use records::*;
