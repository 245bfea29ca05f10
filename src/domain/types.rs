//! Shared domain types.
//!
//! Receipt records mirror the parsing service's JSON exactly (capitalized
//! field names), so the same types are used for decoding the upload response,
//! for the saved `receipts_data.json` file, and for in-memory aggregation.

use serde::{Deserialize, Serialize};

/// Label used for receipts without a usable date.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Caption of the spending dataset shown on charts.
pub const SERIES_CAPTION: &str = "Total Spending by Date";

/// One parsed receipt as returned by the parsing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Items")]
    pub items: Vec<String>,
    /// Positionally aligned with `items`; may be shorter.
    #[serde(rename = "Prices")]
    pub prices: Vec<f64>,
    #[serde(rename = "Total", default)]
    pub total: Option<f64>,
}

impl ReceiptRecord {
    /// Date label used for grouping and display.
    ///
    /// Missing and blank dates collapse into [`UNKNOWN_DATE`].
    pub fn date_label(&self) -> &str {
        match self.date.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => UNKNOWN_DATE,
        }
    }

    /// Pair every item with its price, substituting `0` for missing prices.
    ///
    /// The result always has `items.len()` entries; surplus prices are dropped.
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| LineItem {
                item: item.clone(),
                price: self.price_at(i),
            })
            .collect()
    }

    /// The explicit total when it is present and non-zero, otherwise the sum
    /// of all prices.
    ///
    /// An explicit `0` is treated like a missing total: the parsing service
    /// cannot tell "no total found" apart from a zero-value receipt, and the
    /// derived sum has always won in that case.
    pub fn effective_total(&self) -> f64 {
        match self.total {
            Some(t) if t != 0.0 && !t.is_nan() => t,
            _ => self.prices.iter().sum(),
        }
    }

    fn price_at(&self, index: usize) -> f64 {
        match self.prices.get(index) {
            Some(p) if !p.is_nan() => *p,
            _ => 0.0,
        }
    }
}

/// An `(item, price)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: String,
    pub price: f64,
}

/// Spending accumulated for a single date label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateBucket {
    pub total: f64,
    /// All line items for the date, in record order then item order.
    pub items: Vec<LineItem>,
}

/// Chart-ready projection: one value per date label, first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(label, value)` pairs in chart order.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn grand_total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

/// Envelope returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<ReceiptRecord>,
}
