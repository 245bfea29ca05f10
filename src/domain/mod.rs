//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - parsed receipts as the service returns them (`ReceiptRecord`, `UploadResponse`)
//! - aggregation outputs (`DateBucket`, `ChartSeries`)

pub mod types;

pub use types::*;
