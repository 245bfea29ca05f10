//! View state for one upload cycle.
//!
//! Front-ends hold a single `ViewState`. Records and series are only ever
//! replaced together, and only after a successful upload.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use log::error;

use crate::aggregate::{Aggregation, aggregate};
use crate::domain::{ChartSeries, ReceiptRecord};
use crate::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    selected_files: Vec<PathBuf>,
    records: Vec<ReceiptRecord>,
    /// `None` until the first successful upload.
    aggregation: Option<Aggregation>,
    uploaded_at: Option<DateTime<Local>>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_files(&mut self, files: Vec<PathBuf>) {
        self.selected_files = files;
    }

    pub fn selected_files(&self) -> &[PathBuf] {
        &self.selected_files
    }

    pub fn records(&self) -> &[ReceiptRecord] {
        &self.records
    }

    pub fn series(&self) -> Option<&ChartSeries> {
        self.aggregation.as_ref().map(|a| &a.series)
    }

    pub fn aggregation(&self) -> Option<&Aggregation> {
        self.aggregation.as_ref()
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Local>> {
        self.uploaded_at
    }

    /// Whether there is an itemization to show.
    pub fn has_results(&self) -> bool {
        !self.records.is_empty()
    }

    /// Whether there is a chart to draw; an empty series draws nothing.
    pub fn has_chart(&self) -> bool {
        self.series().is_some_and(|s| !s.is_empty())
    }

    /// Replace records and series with a fresh result.
    pub fn replace(&mut self, records: Vec<ReceiptRecord>) {
        self.aggregation = Some(aggregate(&records));
        self.records = records;
        self.uploaded_at = Some(Local::now());
    }

    /// Apply the outcome of an upload.
    ///
    /// Failures are logged and returned; the previous records and series stay
    /// on display untouched.
    pub fn apply_upload(&mut self, result: Result<Vec<ReceiptRecord>, AppError>) -> Result<(), AppError> {
        match result {
            Ok(records) => {
                self.replace(records);
                Ok(())
            }
            Err(err) => {
                error!("Error uploading receipts: {err}");
                Err(err)
            }
        }
    }
}
