//! Weekly bull/bear classification with the weekday of each week's high and low.

use data_engine::{
    aggregate_weekly_table, summarize_bars, write_csv, Bar, DataError, Direction, Localization,
    PeriodKind, WeeklySummaryRow,
};
use std::path::PathBuf;

use super::{emit, load_bars, Report};
use crate::config::AnalysisConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummaryReport {
    pub rows: Vec<WeeklySummaryRow>,
}

impl WeeklySummaryReport {
    pub fn compute(bars: &[Bar], week: PeriodKind) -> Result<Self> {
        let summaries = summarize_bars(bars, week)?;
        if summaries.is_empty() {
            return Err(DataError::empty("No weeks found in data.").into());
        }
        Ok(WeeklySummaryReport {
            rows: aggregate_weekly_table(&summaries),
        })
    }

    pub fn bullish_weeks(&self) -> usize {
        self.rows.iter().filter(|r| r.direction == Direction::Bullish).count()
    }
}

impl Report for WeeklySummaryReport {
    fn render(&self) -> String {
        let bull = self.bullish_weeks();
        format!(
            "Summarised {} weeks ({} bullish, {} bearish)",
            self.rows.len(),
            bull,
            self.rows.len() - bull
        )
    }

    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        write_csv(&self.rows, &config.summary_path)?;
        Ok(vec![config.summary_path.clone()])
    }
}

/// Date-only input keeps its calendar days. Intraday input is still converted from UTC.
pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let bars = load_bars(config, Localization::ReferenceWall)?;
    let report = WeeklySummaryReport::compute(&bars, config.week_kind())?;
    emit(&report, config)
}
