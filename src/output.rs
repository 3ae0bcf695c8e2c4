use crate::error::ReportError;
use crate::types::{MetricReport, MetricValue};
use serde::Serialize;

/// One metric as it appears in `metrics.json`. Label metrics serialize as
/// strings, counts as integers, NaN sentinels as `null`.
#[derive(Debug, Serialize)]
pub struct MetricExport {
    pub metric: &'static str,
    pub value: MetricValue,
}

pub fn metric_export(report: &MetricReport) -> Vec<MetricExport> {
    report
        .entries
        .iter()
        .map(|(name, value)| MetricExport {
            metric: name.label(),
            value: value.clone(),
        })
        .collect()
}

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| ReportError::export(path, e))?;
    for r in rows {
        wtr.serialize(r).map_err(|e| ReportError::export(path, e))?;
    }
    wtr.flush().map_err(|e| ReportError::export(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), ReportError> {
    let s = serde_json::to_string_pretty(value).map_err(|e| ReportError::export(path, e))?;
    std::fs::write(path, s).map_err(|e| ReportError::export(path, e))?;
    Ok(())
}
