pub mod category;
pub mod config;
pub mod error;
pub mod frequency;
pub mod render;
pub mod reports;
pub mod run_length;

pub use crate::config::{AnalysisConfig, FileConfig};
pub use crate::error::{ReportError, Result};
pub use crate::frequency::{
    percent_of, read_frequency_table, Distribution, FrequencyTable, JointDistribution, JointTable,
};
pub use crate::reports::{run_all, run_report, ReportKind, RunOutcome};
pub use crate::run_length::{run_length_probs, RunLengthProbability};
