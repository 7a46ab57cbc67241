use chrono::{NaiveDate, Weekday};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::calendar::{weekday_from_name, weekday_name};
use crate::data_engine::CsvRecord;
use crate::error::{DataError, Result};
use crate::period_summary::{Direction, Extreme, PeriodSummary};

const WEEK_START_FORMAT: &str = "%Y-%m-%d";

/// One line of the weekly summary file: `Week_Start, Bull_Bear, High_Day, Low_Day`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummaryRow {
    pub week_start: NaiveDate,
    pub direction: Direction,
    pub high_day: Weekday,
    pub low_day: Weekday,
}

impl WeeklySummaryRow {
    pub fn from_summary(summary: &PeriodSummary) -> Self {
        WeeklySummaryRow {
            week_start: summary.period_start,
            direction: summary.direction,
            high_day: summary.weekday_of(Extreme::High),
            low_day: summary.weekday_of(Extreme::Low),
        }
    }

    pub fn day_of(&self, extreme: Extreme) -> Weekday {
        match extreme {
            Extreme::High => self.high_day,
            Extreme::Low => self.low_day,
        }
    }
}

impl CsvRecord for WeeklySummaryRow {
    fn headers() -> &'static [&'static str] {
        &["Week_Start", "Bull_Bear", "High_Day", "Low_Day"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.week_start.format(WEEK_START_FORMAT).to_string(),
            self.direction.to_string(),
            weekday_name(self.high_day).to_string(),
            weekday_name(self.low_day).to_string(),
        ]
    }
}

pub fn aggregate_weekly_table(summaries: &[PeriodSummary]) -> Vec<WeeklySummaryRow> {
    summaries.iter().map(WeeklySummaryRow::from_summary).collect()
}

#[derive(Debug, Deserialize)]
struct RawWeeklyRow {
    #[serde(rename = "Week_Start")]
    week_start: String,
    #[serde(rename = "Bull_Bear")]
    bull_bear: String,
    #[serde(rename = "High_Day")]
    high_day: String,
    #[serde(rename = "Low_Day")]
    low_day: String,
}

impl RawWeeklyRow {
    fn validate(self, line: u64) -> Result<WeeklySummaryRow> {
        let bad = |reason: String| DataError::UnparseableRow { line, reason };
        let week_start = NaiveDate::parse_from_str(self.week_start.trim(), WEEK_START_FORMAT)
            .map_err(|_| bad(format!("bad Week_Start '{}'", self.week_start)))?;
        let direction = self.bull_bear.parse::<Direction>().map_err(bad)?;
        let high_day = weekday_from_name(&self.high_day)
            .ok_or_else(|| bad(format!("bad High_Day '{}'", self.high_day)))?;
        let low_day = weekday_from_name(&self.low_day)
            .ok_or_else(|| bad(format!("bad Low_Day '{}'", self.low_day)))?;
        Ok(WeeklySummaryRow { week_start, direction, high_day, low_day })
    }
}

/// Read a weekly summary (comma-delimited, header row). Rows with values outside the
/// accepted vocabulary are skipped with a warning.
pub fn read_weekly_table<P: AsRef<Path>>(path: P) -> Result<Vec<WeeklySummaryRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::SourceNotFound { path: path.to_path_buf() });
    }
    let rows = read_weekly_table_from(File::open(path)?)?;
    info!(path = %path.display(), weeks = rows.len(), "loaded weekly summary");
    Ok(rows)
}

pub fn read_weekly_table_from<R: Read>(reader: R) -> Result<Vec<WeeklySummaryRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<RawWeeklyRow>().enumerate() {
        let line = idx as u64 + 2;
        let row = result
            .map_err(|e| DataError::UnparseableRow { line, reason: e.to_string() })
            .and_then(|raw| raw.validate(line));
        match row {
            Ok(r) => rows.push(r),
            Err(e) => warn!("skipping {e}"),
        }
    }

    if rows.is_empty() {
        return Err(DataError::empty("weekly summary contains no usable weeks"));
    }
    Ok(rows)
}
