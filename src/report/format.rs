//! Formatted terminal output: per-receipt itemization and the spending table.
//!
//! We keep formatting code in one place so output changes are localized
//! (the golden-string tests below pin the layout).

use crate::domain::{ChartSeries, ReceiptRecord, SERIES_CAPTION};

/// Itemize every receipt: date header, one line per item, then the total.
///
/// Every item gets a line; a missing price prints as `$0.00`.
pub fn format_receipts(records: &[ReceiptRecord]) -> String {
    let mut out = String::new();

    out.push_str("=== Parsed Receipt Data ===\n");
    if records.is_empty() {
        out.push_str("(no receipts)\n");
        return out;
    }

    for (idx, record) in records.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Date: {}\n", record.date_label()));
        for line in record.line_items() {
            out.push_str(&format!("  - {}: {}\n", line.item, fmt_money(line.price)));
        }
        out.push_str(&format!("Total: {}\n", fmt_money(record.effective_total())));
    }

    out
}

/// Format the date/total table behind the chart.
pub fn format_series(series: &ChartSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("{SERIES_CAPTION}:\n"));

    let width = series
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max("date".len());

    out.push_str(&format!("{:<width$} {:>12}\n", "date", "total"));
    out.push_str(&format!("{:-<width$} {:-<12}\n", "", ""));
    for (label, value) in series.points() {
        out.push_str(&format!("{label:<width$} {:>12}\n", fmt_money(value)));
    }
    out.push_str(&format!("{:<width$} {:>12}\n", "all", fmt_money(series.grand_total())));

    out
}

pub fn fmt_money(v: f64) -> String {
    if v < 0.0 {
        format!("-${:.2}", -v)
    } else {
        format!("${v:.2}")
    }
}
