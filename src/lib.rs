//! `receipt-analyzer` library crate.
//!
//! The binary (`receipts`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the aggregation can be reused by other front-ends
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod state;
pub mod tui;
pub mod upload;
