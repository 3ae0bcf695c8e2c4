use thiserror::Error;

/// Errors that abort a render round. Degenerate numeric cases (empty
/// subsets, zero denominators) never appear here; they become NaN sentinels
/// or omitted metrics inside the engine.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The file could not be read or decoded as tabular data.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    /// A required column is absent from the header row.
    #[error("required column `{column}` is missing")]
    Schema { column: &'static str },

    /// An exported report file could not be written.
    #[error("failed to write {path}: {reason}")]
    Export { path: String, reason: String },
}

impl ReportError {
    pub fn parse(path: &str, reason: impl ToString) -> Self {
        ReportError::Parse {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn export(path: &str, reason: impl ToString) -> Self {
        ReportError::Export {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
