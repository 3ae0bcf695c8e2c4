// The metric engine: clean step plus the fixed, ordered metric set.
use crate::types::{MetricName, MetricReport, MetricValue, RawRecord, Record};
use crate::util::{mean, range, round2, round_half_even};
use std::collections::{HashMap, HashSet};

/// Drop rows missing any of the three key numeric fields and derive the
/// rounded-duration grouping key. Everything downstream of the loader works
/// on this clean table, except the missing-polycount metrics.
pub fn clean(rows: &[RawRecord]) -> Vec<Record> {
    rows.iter()
        .filter_map(|r| {
            let duration_hours = r.duration_hours?;
            let polycount = r.polycount?;
            let messages_sent = r.messages_sent?;
            Some(Record {
                date: r.date.clone(),
                duration_hours,
                polycount,
                messages_sent,
                category: r.category.clone(),
                sub_category: r.sub_category.clone(),
                duration_rounded: round_half_even(duration_hours),
            })
        })
        .collect()
}

/// Compute the full metric set. The entry order is fixed; it is both the
/// display order and the row order the comparator aligns on.
///
/// `original` is the pre-clean table; only the missing-polycount metrics
/// read it.
pub fn compute_metrics(original: &[RawRecord], clean: &[Record]) -> MetricReport {
    let mut entries: Vec<(MetricName, MetricValue)> = Vec::new();

    let days = distinct_count(clean.iter().filter_map(|r| r.date.as_deref()));
    entries.push((MetricName::DaysObserved, MetricValue::Count(days as i64)));

    let total_incidents: u64 = clean.iter().map(|r| r.polycount).sum();
    entries.push((
        MetricName::TotalIncidents,
        MetricValue::Count(total_incidents as i64),
    ));

    let durations: Vec<f64> = clean.iter().map(|r| r.duration_hours).collect();
    entries.push((
        MetricName::MeanDurationHours,
        MetricValue::Number(mean(&durations)),
    ));
    entries.push((
        MetricName::TotalDurationHours,
        MetricValue::Number(durations.iter().sum()),
    ));
    entries.push((
        MetricName::DurationRangeHours,
        MetricValue::Number(range(&durations)),
    ));

    // Sub-category extremes over shortages that stayed open for more than an
    // hour. Both metrics are omitted together when the subset is empty.
    let long_subs: Vec<&str> = clean
        .iter()
        .filter(|r| r.duration_hours > 1.0)
        .filter_map(|r| r.sub_category.as_deref())
        .collect();
    if let Some((most, least)) = frequency_extremes(&long_subs) {
        entries.push((
            MetricName::TopSubCategory,
            MetricValue::Label(most.to_string()),
        ));
        entries.push((
            MetricName::BottomSubCategory,
            MetricValue::Label(least.to_string()),
        ));
    }

    // Date extremes over shortages with any open time at all; independent
    // subset from the one above.
    let active_dates: Vec<&str> = clean
        .iter()
        .filter(|r| r.duration_hours > 0.0)
        .filter_map(|r| r.date.as_deref())
        .collect();
    if let Some((most, least)) = frequency_extremes(&active_dates) {
        entries.push((MetricName::PeakDate, MetricValue::Label(most.to_string())));
        entries.push((
            MetricName::QuietestDate,
            MetricValue::Label(least.to_string()),
        ));
    }

    let over_one = clean.iter().filter(|r| r.duration_hours > 1.0).count();
    let pct_over_one = if clean.is_empty() {
        f64::NAN
    } else {
        round2(over_one as f64 / clean.len() as f64 * 100.0)
    };
    entries.push((MetricName::PctOverOneHour, MetricValue::Number(pct_over_one)));

    let categories = distinct_count(clean.iter().filter_map(|r| r.category.as_deref()));
    entries.push((
        MetricName::CategoryCount,
        MetricValue::Count(categories as i64),
    ));
    let sub_categories = distinct_count(clean.iter().filter_map(|r| r.sub_category.as_deref()));
    entries.push((
        MetricName::SubCategoryCount,
        MetricValue::Count(sub_categories as i64),
    ));

    // Missing polycount is measured against the original table, not the
    // clean one; rows dropped for other reasons still count toward the
    // denominator.
    let missing = original.iter().filter(|r| r.polycount.is_none()).count();
    entries.push((
        MetricName::MissingPolycount,
        MetricValue::Count(missing as i64),
    ));
    let missing_pct = if original.is_empty() {
        f64::NAN
    } else {
        round2(missing as f64 / original.len() as f64 * 100.0)
    };
    entries.push((
        MetricName::MissingPolycountPct,
        MetricValue::Number(missing_pct),
    ));

    MetricReport { entries }
}

fn distinct_count<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.collect::<HashSet<_>>().len()
}

/// Most- and least-frequent value of a pool, `None` when the pool is empty.
/// Ties break toward the value seen first in input order, so the result is
/// deterministic for any row ordering.
fn frequency_extremes<'a>(values: &[&'a str]) -> Option<(&'a str, &'a str)> {
    if values.is_empty() {
        return None;
    }
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, &v) in values.iter().enumerate() {
        let entry = counts.entry(v).or_insert((0, i));
        entry.0 += 1;
    }
    let tally: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(v, (count, first))| (v, count, first))
        .collect();

    let mut most = tally[0];
    let mut least = tally[0];
    for t in &tally[1..] {
        if t.1 > most.1 || (t.1 == most.1 && t.2 < most.2) {
            most = *t;
        }
        if t.1 < least.1 || (t.1 == least.1 && t.2 < least.2) {
            least = *t;
        }
    }
    Some((most.0, least.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        date: &str,
        duration: Option<f64>,
        polycount: Option<u64>,
        messages: Option<u64>,
        category: &str,
        sub_category: &str,
    ) -> RawRecord {
        RawRecord {
            date: Some(date.to_string()),
            duration_hours: duration,
            polycount,
            messages_sent: messages,
            category: Some(category.to_string()),
            sub_category: Some(sub_category.to_string()),
        }
    }

    fn get(report: &MetricReport, name: MetricName) -> MetricValue {
        report.get(name).cloned().unwrap()
    }

    #[test]
    fn clean_drops_rows_missing_any_key_field() {
        let rows = vec![
            raw("2024-01-01", Some(1.6), Some(2), Some(5), "net", "fiber"),
            raw("2024-01-02", None, Some(2), Some(5), "net", "fiber"),
            raw("2024-01-03", Some(1.0), None, Some(5), "net", "fiber"),
            raw("2024-01-04", Some(1.0), Some(2), None, "net", "fiber"),
        ];
        let clean = clean(&rows);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].duration_rounded, 2);
    }

    #[test]
    fn metric_order_is_fixed() {
        let rows = vec![
            raw("2024-01-01", Some(2.0), Some(1), Some(4), "net", "fiber"),
            raw("2024-01-02", Some(0.5), Some(2), Some(1), "net", "copper"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);
        let names: Vec<MetricName> = report.entries.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                MetricName::DaysObserved,
                MetricName::TotalIncidents,
                MetricName::MeanDurationHours,
                MetricName::TotalDurationHours,
                MetricName::DurationRangeHours,
                MetricName::TopSubCategory,
                MetricName::BottomSubCategory,
                MetricName::PeakDate,
                MetricName::QuietestDate,
                MetricName::PctOverOneHour,
                MetricName::CategoryCount,
                MetricName::SubCategoryCount,
                MetricName::MissingPolycount,
                MetricName::MissingPolycountPct,
            ]
        );
    }

    #[test]
    fn computes_core_aggregates() {
        let rows = vec![
            raw("2024-01-01", Some(2.0), Some(3), Some(4), "net", "fiber"),
            raw("2024-01-01", Some(4.0), Some(1), Some(1), "power", "grid"),
            raw("2024-01-02", Some(0.5), Some(2), Some(1), "net", "fiber"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);

        assert_eq!(get(&report, MetricName::DaysObserved), MetricValue::Count(2));
        assert_eq!(get(&report, MetricName::TotalIncidents), MetricValue::Count(6));
        assert_eq!(
            get(&report, MetricName::MeanDurationHours),
            MetricValue::Number(6.5 / 3.0)
        );
        assert_eq!(
            get(&report, MetricName::TotalDurationHours),
            MetricValue::Number(6.5)
        );
        assert_eq!(
            get(&report, MetricName::DurationRangeHours),
            MetricValue::Number(3.5)
        );
        assert_eq!(
            get(&report, MetricName::PctOverOneHour),
            MetricValue::Number(66.67)
        );
        assert_eq!(get(&report, MetricName::CategoryCount), MetricValue::Count(2));
        assert_eq!(get(&report, MetricName::SubCategoryCount), MetricValue::Count(2));
    }

    #[test]
    fn category_count_never_exceeds_rows_and_is_one_when_uniform() {
        let rows = vec![
            raw("2024-01-01", Some(1.0), Some(1), Some(1), "net", "a"),
            raw("2024-01-02", Some(1.0), Some(1), Some(1), "net", "b"),
            raw("2024-01-03", Some(1.0), Some(1), Some(1), "net", "c"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);
        let MetricValue::Count(n) = get(&report, MetricName::CategoryCount) else {
            panic!("category count must be a count");
        };
        assert!(n as usize <= table.len());
        assert_eq!(n, 1);
    }

    #[test]
    fn extremum_metrics_are_absent_when_subsets_are_empty() {
        // No duration above one hour, no duration above zero.
        let rows = vec![
            raw("2024-01-01", Some(0.0), Some(1), Some(1), "net", "fiber"),
            raw("2024-01-02", Some(0.0), Some(1), Some(1), "net", "copper"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);
        assert!(report.get(MetricName::TopSubCategory).is_none());
        assert!(report.get(MetricName::BottomSubCategory).is_none());
        assert!(report.get(MetricName::PeakDate).is_none());
        assert!(report.get(MetricName::QuietestDate).is_none());
        assert_eq!(report.entries.len(), 10);
    }

    #[test]
    fn date_subset_is_independent_of_sub_category_subset() {
        // Open time on every row, but never more than an hour: date extremes
        // present, sub-category extremes absent.
        let rows = vec![
            raw("2024-01-01", Some(0.5), Some(1), Some(1), "net", "fiber"),
            raw("2024-01-02", Some(0.9), Some(1), Some(1), "net", "copper"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);
        assert!(report.get(MetricName::TopSubCategory).is_none());
        assert!(report.get(MetricName::PeakDate).is_some());
    }

    #[test]
    fn frequency_ties_break_toward_first_seen() {
        let values = vec!["b", "a", "b", "a", "c"];
        let (most, least) = frequency_extremes(&values).unwrap();
        assert_eq!(most, "b"); // b and a both occur twice; b seen first
        assert_eq!(least, "c");

        let uniform = vec!["y", "x", "z"];
        let (most, least) = frequency_extremes(&uniform).unwrap();
        assert_eq!(most, "y");
        assert_eq!(least, "y");
    }

    #[test]
    fn peak_and_quietest_dates_count_occurrences() {
        let rows = vec![
            raw("2024-01-01", Some(2.0), Some(1), Some(1), "net", "fiber"),
            raw("2024-01-01", Some(3.0), Some(1), Some(1), "net", "fiber"),
            raw("2024-01-02", Some(1.5), Some(1), Some(1), "net", "fiber"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);
        assert_eq!(
            get(&report, MetricName::PeakDate),
            MetricValue::Label("2024-01-01".to_string())
        );
        assert_eq!(
            get(&report, MetricName::QuietestDate),
            MetricValue::Label("2024-01-02".to_string())
        );
    }

    #[test]
    fn missing_polycount_is_measured_against_the_original_table() {
        let rows = vec![
            raw("2024-01-01", Some(1.0), Some(1), Some(1), "net", "fiber"),
            raw("2024-01-02", Some(1.0), None, Some(1), "net", "fiber"),
            // Dropped for a different reason; still in the denominator.
            raw("2024-01-03", None, Some(1), Some(1), "net", "fiber"),
            raw("2024-01-04", None, None, Some(1), "net", "fiber"),
        ];
        let table = clean(&rows);
        let report = compute_metrics(&rows, &table);
        assert_eq!(get(&report, MetricName::MissingPolycount), MetricValue::Count(2));
        assert_eq!(
            get(&report, MetricName::MissingPolycountPct),
            MetricValue::Number(50.0)
        );
    }

    #[test]
    fn empty_clean_table_yields_nan_sentinels_not_panics() {
        let rows = vec![raw("2024-01-01", None, None, None, "net", "fiber")];
        let table = clean(&rows);
        assert!(table.is_empty());
        let report = compute_metrics(&rows, &table);

        assert_eq!(get(&report, MetricName::DaysObserved), MetricValue::Count(0));
        assert_eq!(get(&report, MetricName::TotalIncidents), MetricValue::Count(0));
        let MetricValue::Number(m) = get(&report, MetricName::MeanDurationHours) else {
            panic!("mean must be numeric");
        };
        assert!(m.is_nan());
        let MetricValue::Number(p) = get(&report, MetricName::PctOverOneHour) else {
            panic!("percentage must be numeric");
        };
        assert!(p.is_nan());
        assert_eq!(
            get(&report, MetricName::TotalDurationHours),
            MetricValue::Number(0.0)
        );
    }

    #[test]
    fn empty_original_table_makes_missing_pct_nan() {
        let report = compute_metrics(&[], &[]);
        let MetricValue::Number(p) = get(&report, MetricName::MissingPolycountPct) else {
            panic!("missing pct must be numeric");
        };
        assert!(p.is_nan());
    }
}
