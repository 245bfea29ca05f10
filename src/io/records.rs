//! Read/write receipt records as JSON.
//!
//! The file layout matches what the parsing service returns, so a saved file
//! can be replayed with `receipts show --json <file>`:
//! - a bare array of records (what `--save-json` writes), or
//! - the full `{ "data": [...] }` upload response.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{ReceiptRecord, UploadResponse};
use crate::error::AppError;

#[derive(Deserialize)]
#[serde(untagged)]
enum SavedRecords {
    Envelope(UploadResponse),
    Bare(Vec<ReceiptRecord>),
}

/// Write records as a pretty JSON array.
pub fn write_records_json(path: &Path, records: &[ReceiptRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create records JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, records)
        .map_err(|e| AppError::io(format!("Failed to write records JSON: {e}")))?;

    Ok(())
}

/// Read records from a saved array or upload response.
pub fn read_records_json(path: &Path) -> Result<Vec<ReceiptRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open records JSON '{}': {e}", path.display())))?;

    let saved: SavedRecords = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        AppError::decode(format!("Invalid records JSON '{}': {e}", path.display()))
    })?;

    Ok(match saved {
        SavedRecords::Envelope(resp) => resp.data,
        SavedRecords::Bare(records) => records,
    })
}
