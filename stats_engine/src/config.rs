//! Analysis settings passed explicitly into every report.
//!
//! Defaults match the original workflow: `;`-delimited input, US Eastern reference
//! timezone, Monday week start, run lengths up to 4 days and the four Eastern
//! trading sessions. A JSON file may override any field:
//!
//! ```json
//! {
//!   "input": "nq.csv",
//!   "delimiter": ";",
//!   "timezone": "America/New_York",
//!   "week_start": "Monday",
//!   "max_run_length": 5,
//!   "sessions": [
//!     { "name": "London", "start": "03:00", "end": "08:00" }
//!   ]
//! }
//! ```

use chrono::Weekday;
use chrono_tz::Tz;
use data_engine::{Localization, PeriodKind, SessionDefinition, SourceConfig, TRADING_WEEKDAYS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};
use crate::run_length::DEFAULT_MAX_RUN_LENGTH;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: SourceConfig,
    pub week_start: Weekday,
    pub max_run_length: usize,
    pub sessions: SessionDefinition,
    /// Weekday columns reported in weekday tables, in order.
    pub trading_days: Vec<Weekday>,
    pub output_dir: PathBuf,
    /// Output of the weekly summary and input of the weekday distribution.
    pub summary_path: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            source: SourceConfig::default(),
            week_start: Weekday::Mon,
            max_run_length: DEFAULT_MAX_RUN_LENGTH,
            sessions: SessionDefinition::default(),
            trading_days: TRADING_WEEKDAYS.to_vec(),
            output_dir: PathBuf::from("."),
            summary_path: PathBuf::from("results.csv"),
        }
    }
}

impl AnalysisConfig {
    pub fn week_kind(&self) -> PeriodKind {
        PeriodKind::Week { start: self.week_start }
    }

    /// Source settings with the given localization applied.
    pub fn source_with(&self, localization: Localization) -> SourceConfig {
        self.source.clone().with_localization(localization)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_run_length < 2 {
            return Err(ReportError::config(format!(
                "max run length must be at least 2, got {}",
                self.max_run_length
            )));
        }
        if self.trading_days.is_empty() {
            return Err(ReportError::config("at least one trading day is required"));
        }
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReportError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let file: FileConfig = serde_json::from_str(&text)?;
        AnalysisConfig::default().apply(file)
    }

    /// Overlay every field present in `file`.
    pub fn apply(mut self, file: FileConfig) -> Result<Self> {
        if let Some(input) = file.input {
            self.source.path = input;
        }
        if let Some(d) = file.delimiter {
            self.source.delimiter = parse_delimiter(&d)?;
        }
        if let Some(tz) = file.timezone {
            self.source.reference_tz = parse_timezone(&tz)?;
        }
        if let Some(day) = file.week_start {
            self.week_start = parse_weekday(&day)?;
        }
        if let Some(n) = file.max_run_length {
            self.max_run_length = n;
        }
        if let Some(sessions) = file.sessions {
            self.sessions = sessions;
        }
        if let Some(days) = file.trading_days {
            self.trading_days = days
                .iter()
                .map(|d| parse_weekday(d))
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(dir) = file.output_dir {
            self.output_dir = dir;
        }
        if let Some(summary) = file.summary {
            self.summary_path = summary;
        }
        self.validate()?;
        Ok(self)
    }
}

/// On-disk shape of the configuration. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub timezone: Option<String>,
    pub week_start: Option<String>,
    pub max_run_length: Option<usize>,
    pub sessions: Option<SessionDefinition>,
    pub trading_days: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// A single ASCII character, or `tab` / `\t`.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(ReportError::config(format!(
            "delimiter must be a single ASCII character, got '{s}'"
        ))),
    }
}

pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|e| ReportError::config(format!("unknown timezone '{s}': {e}")))
}

/// Accepts `Mon` or `Monday`, any case.
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ReportError::config(format!("unknown weekday '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalysisConfig::default();
        assert_eq!(c.source.delimiter, b';');
        assert_eq!(c.source.reference_tz, chrono_tz::America::New_York);
        assert_eq!(c.week_kind(), PeriodKind::weekly());
        assert_eq!(c.max_run_length, 4);
        assert_eq!(c.sessions.windows().len(), 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn json_overrides_fields() {
        let json = r#"{
            "delimiter": ",",
            "timezone": "Europe/London",
            "week_start": "Sunday",
            "max_run_length": 6,
            "sessions": [{ "name": "Cash", "start": "08:00", "end": "16:30" }]
        }"#;
        let file: FileConfig = serde_json::from_str(json).unwrap();
        let c = AnalysisConfig::default().apply(file).unwrap();
        assert_eq!(c.source.delimiter, b',');
        assert_eq!(c.source.reference_tz, chrono_tz::Europe::London);
        assert_eq!(c.week_start, Weekday::Sun);
        assert_eq!(c.max_run_length, 6);
        assert_eq!(c.sessions.names(), vec!["Cash".to_string(), "Other".to_string()]);
    }

    #[test]
    fn bad_values_are_config_errors() {
        let file: FileConfig = serde_json::from_str(r#"{ "max_run_length": 1 }"#).unwrap();
        assert!(matches!(AnalysisConfig::default().apply(file), Err(ReportError::Config(_))));

        assert!(parse_delimiter(";;").is_err());
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_timezone("Mars/Olympus").is_err());
        assert!(parse_weekday("Funday").is_err());
    }

    #[test]
    fn invalid_session_in_file_is_rejected() {
        let json = r#"{ "sessions": [{ "name": "Bad", "start": "12:00", "end": "09:00" }] }"#;
        assert!(serde_json::from_str::<FileConfig>(json).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<FileConfig>(r#"{ "inptu": "x.csv" }"#).is_err());
    }
}
