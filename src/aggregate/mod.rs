//! Spending aggregation: receipts grouped by date label.
//!
//! One pass over the records, in input order. Buckets keep first-seen order so
//! the chart reads in the same order the receipts were returned.

use std::collections::HashMap;

use crate::domain::{ChartSeries, DateBucket, ReceiptRecord};

/// Date buckets plus the chart projection derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// `(date label, bucket)` in first-seen order.
    pub buckets: Vec<(String, DateBucket)>,
    pub series: ChartSeries,
}

/// Group receipts by date and total their spending.
pub fn aggregate(records: &[ReceiptRecord]) -> Aggregation {
    let mut buckets: Vec<(String, DateBucket)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let label = record.date_label();
        let slot = match index.get(label).copied() {
            Some(i) => i,
            None => {
                buckets.push((label.to_string(), DateBucket::default()));
                index.insert(label.to_string(), buckets.len() - 1);
                buckets.len() - 1
            }
        };

        let bucket = &mut buckets[slot].1;
        bucket.total += record.effective_total();
        bucket.items.extend(record.line_items());
    }

    let series = ChartSeries {
        labels: buckets.iter().map(|(l, _)| l.clone()).collect(),
        values: buckets.iter().map(|(_, b)| b.total).collect(),
    };

    Aggregation { buckets, series }
}
