//! Plain-text charts.

pub mod ascii;

pub use ascii::*;
