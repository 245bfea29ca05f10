//! Export the spending series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::ChartSeries;
use crate::error::AppError;

/// Write `date,total` rows in chart order.
///
/// Date labels come from the parsing service verbatim, so quoting is left to
/// the CSV writer.
pub fn write_series_csv(path: &Path, series: &ChartSeries) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    wtr.write_record(["date", "total"])
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for (label, value) in series.points() {
        wtr.write_record([label, format!("{value:.2}").as_str()])
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV '{}': {e}", path.display())))?;

    Ok(())
}
