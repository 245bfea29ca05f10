//! Shared "records → aggregate" logic used by both CLI and TUI front-ends.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use crate::aggregate::{Aggregation, aggregate};
use crate::domain::ReceiptRecord;
use crate::error::AppError;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<ReceiptRecord>,
    pub aggregation: Aggregation,
}

impl RunOutput {
    pub fn from_records(records: Vec<ReceiptRecord>) -> Self {
        let aggregation = aggregate(&records);
        Self {
            records,
            aggregation,
        }
    }
}

/// Aggregate a previously saved records file.
pub fn run_saved(path: &Path) -> Result<RunOutput, AppError> {
    let records = crate::io::read_records_json(path)?;
    Ok(RunOutput::from_records(records))
}
