// Period-over-period comparison of two metric reports.
use crate::types::{Comparison, MetricReport, MetricValue};
use crate::util::round2;

/// Align the two reports by metric name in T0 order and attach deltas.
///
/// Both reports come from the same engine, so the name sets normally match
/// position for position; a metric present on only one side (an extremum
/// pair omitted for exactly one dataset) is skipped rather than mis-zipped.
pub fn compare(t0: &MetricReport, t1: &MetricReport) -> Vec<Comparison> {
    t0.entries
        .iter()
        .filter_map(|(name, v0)| {
            let v1 = t1.get(*name)?;
            let (delta, pct_delta) = deltas(v0, v1);
            Some(Comparison {
                name: *name,
                t0: v0.clone(),
                t1: v1.clone(),
                delta,
                pct_delta,
            })
        })
        .collect()
}

/// T1 - T0 and its percentage of T0. Label metrics and NaN sentinels make
/// both deltas `None`; a zero baseline makes only the percent delta `None`.
fn deltas(t0: &MetricValue, t1: &MetricValue) -> (Option<f64>, Option<f64>) {
    let (Some(a), Some(b)) = (numeric(t0), numeric(t1)) else {
        return (None, None);
    };
    let delta = b - a;
    let pct = if a == 0.0 {
        None
    } else {
        Some(round2(delta / a * 100.0))
    };
    (Some(delta), pct)
}

fn numeric(v: &MetricValue) -> Option<f64> {
    match v {
        MetricValue::Count(n) => Some(*n as f64),
        MetricValue::Number(x) if x.is_finite() => Some(*x),
        _ => None,
    }
}
