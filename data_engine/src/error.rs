use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading and grouping bars.
#[derive(Debug, Error)]
pub enum DataError {
    /// The input file does not exist. This is the only condition that halts a whole run.
    #[error("input file '{}' not found, adjust the input path to your filename", path.display())]
    SourceNotFound { path: PathBuf },

    /// A row whose date or price fields could not be read. Recovered by dropping the row.
    #[error("row {line}: {reason}")]
    UnparseableRow { line: u64, reason: String },

    /// No usable data for an analysis (no valid bars, or no periods of the required class).
    #[error("{0}")]
    EmptyDataset(String),

    #[error("period contains no bars")]
    EmptyPeriod,

    #[error("invalid session window: {0}")]
    InvalidSession(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn empty(msg: impl Into<String>) -> Self {
        DataError::EmptyDataset(msg.into())
    }

    /// True for conditions a report should print and move past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DataError::EmptyDataset(_))
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
