// Loading of uploaded datasets into the original (pre-clean) table.
//
// Routing is by file-name suffix, never by content sniffing: `.xlsx` goes to
// the Excel parser, everything else (including `.csv`) to the CSV parser.
use crate::error::ReportError;
use crate::types::{RawCsvRow, RawRecord};
use crate::util::{normalize, normalize_date, parse_count_safe, parse_f64_safe};
use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use tracing::{info, warn};

pub const COL_DATE: &str = "date";
pub const COL_DURATION: &str = "duration_hours";
pub const COL_POLYCOUNT: &str = "polycount";
pub const COL_MESSAGES: &str = "messages_sent";
pub const COL_CATEGORY: &str = "category";
pub const COL_SUB_CATEGORY: &str = "sub_category";

const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_DURATION,
    COL_POLYCOUNT,
    COL_MESSAGES,
    COL_CATEGORY,
    COL_SUB_CATEGORY,
];

/// Load one dataset. The returned rows are the original table; rows with
/// missing key fields are kept here and only dropped by the clean step.
pub fn load_table(path: &str) -> Result<Vec<RawRecord>, ReportError> {
    let rows = if path.to_ascii_lowercase().ends_with(".xlsx") {
        load_xlsx(path)?
    } else {
        load_csv(path)?
    };
    let incomplete = rows
        .iter()
        .filter(|r| {
            r.duration_hours.is_none() || r.polycount.is_none() || r.messages_sent.is_none()
        })
        .count();
    info!(path, rows = rows.len(), "dataset loaded");
    if incomplete > 0 {
        warn!(
            rows = incomplete,
            "rows with missing key fields will be excluded from metrics"
        );
    }
    Ok(rows)
}

/// Header validation happens once, up front; a missing column is a schema
/// error before any row is read.
fn column_index(headers: &[String], column: &'static str) -> Result<usize, ReportError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or(ReportError::Schema { column })
}

fn check_schema(headers: &[String]) -> Result<(), ReportError> {
    for column in REQUIRED_COLUMNS {
        column_index(headers, column)?;
    }
    Ok(())
}

fn load_csv(path: &str) -> Result<Vec<RawRecord>, ReportError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReportError::parse(path, e))?;
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| ReportError::parse(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    check_schema(&headers)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawCsvRow>() {
        let row = result.map_err(|e| ReportError::parse(path, e))?;
        rows.push(RawRecord {
            date: normalize(row.date).map(|d| normalize_date(&d)),
            duration_hours: parse_f64_safe(row.duration_hours.as_deref()).filter(|v| *v >= 0.0),
            polycount: parse_count_safe(row.polycount.as_deref()),
            messages_sent: parse_count_safe(row.messages_sent.as_deref()),
            category: normalize(row.category),
            sub_category: normalize(row.sub_category),
        });
    }
    Ok(rows)
}

fn load_xlsx(path: &str) -> Result<Vec<RawRecord>, ReportError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| ReportError::parse(path, e))?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::parse(path, "workbook has no worksheets"))?
        .map_err(|e| ReportError::parse(path, e))?;

    let mut rows_iter = sheet.rows();
    let header_cells = rows_iter
        .next()
        .ok_or_else(|| ReportError::parse(path, "worksheet is empty"))?;
    let headers: Vec<String> = header_cells
        .iter()
        .map(|c| cell_str(c).unwrap_or_default())
        .collect();

    let date = column_index(&headers, COL_DATE)?;
    let duration = column_index(&headers, COL_DURATION)?;
    let polycount = column_index(&headers, COL_POLYCOUNT)?;
    let messages = column_index(&headers, COL_MESSAGES)?;
    let category = column_index(&headers, COL_CATEGORY)?;
    let sub_category = column_index(&headers, COL_SUB_CATEGORY)?;

    let mut rows = Vec::new();
    for cells in rows_iter {
        rows.push(RawRecord {
            date: cells
                .get(date)
                .and_then(cell_str)
                .map(|d| normalize_date(&d)),
            duration_hours: cells
                .get(duration)
                .and_then(cell_f64)
                .filter(|v| *v >= 0.0),
            polycount: cells.get(polycount).and_then(cell_count),
            messages_sent: cells.get(messages).and_then(cell_count),
            category: cells.get(category).and_then(cell_str),
            sub_category: cells.get(sub_category).and_then(cell_str),
        });
    }
    Ok(rows)
}

/// Render a cell as trimmed text. Excel date cells become ISO `YYYY-MM-DD`
/// strings so both encodings agree on the date column.
fn cell_str(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| ndt.date().format("%Y-%m-%d").to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        _ => None,
    }
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_f64_safe(Some(s.as_str())),
        _ => None,
    }
}

fn cell_count(cell: &Data) -> Option<u64> {
    cell_f64(cell)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u64)
}
