// Grouped aggregates over the rounded-duration key, for the distribution
// tables and line charts.
use crate::types::Record;
use std::collections::BTreeMap;

/// Total messages sent per rounded shortage hour, ascending by hour.
pub fn messages_by_rounded_hour(clean: &[Record]) -> Vec<(i64, u64)> {
    sum_by_rounded_hour(clean, |r| r.messages_sent)
}

/// Total shortage incidents (polycount) per rounded shortage hour.
pub fn shortages_by_rounded_hour(clean: &[Record]) -> Vec<(i64, u64)> {
    sum_by_rounded_hour(clean, |r| r.polycount)
}

fn sum_by_rounded_hour(clean: &[Record], value: impl Fn(&Record) -> u64) -> Vec<(i64, u64)> {
    let mut sums: BTreeMap<i64, u64> = BTreeMap::new();
    for r in clean {
        *sums.entry(r.duration_rounded).or_insert(0) += value(r);
    }
    sums.into_iter().collect()
}
