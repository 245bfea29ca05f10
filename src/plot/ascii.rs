//! ASCII bar chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-width bars, one row per date), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)

use crate::domain::ChartSeries;
use crate::report::fmt_money;

const BAR: char = '#';

/// Render the spending series as horizontal bars, `width` columns at most.
pub fn render_ascii_bars(series: &ChartSeries, width: usize) -> String {
    let width = width.max(10);

    let mut out = String::new();
    out.push_str("Spending Trends\n");

    let Some(max) = series.max_value().filter(|m| m.is_finite() && *m > 0.0) else {
        out.push_str("(no data)\n");
        return out;
    };

    let label_width = series
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in series.points() {
        let bar = BAR.to_string().repeat(bar_len(value, max, width));
        out.push_str(&format!(
            "{label:<label_width$} |{bar:<width$} {}\n",
            fmt_money(value)
        ));
    }

    out
}

/// Scale `value` against `max`; any positive spend gets at least one cell.
fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if !(value.is_finite() && value > 0.0) {
        return 0;
    }
    let cells = (value / max * width as f64).round() as usize;
    cells.clamp(1, width)
}
