use data_engine::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("configuration: {0}")]
    Config(String),

    #[error("config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReportError::Config(msg.into())
    }

    /// Missing input aborts a whole run.
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, ReportError::Data(DataError::SourceNotFound { .. }))
    }

    /// Empty data is reported and the run moves on to the next report.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReportError::Data(e) if e.is_recoverable())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
