//! Bullish years only: which month and which quarter held the year's low.

use data_engine::{
    summarize_bars, write_csv, CsvRecord, DataError, Extreme, Localization, PeriodKind,
    PeriodSummary,
};
use std::fmt::Write;
use std::path::PathBuf;

use super::{emit, load_bars, Report};
use crate::category::{all_months, all_quarters, Category, MonthOfYear, Quarter};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::frequency::Distribution;

pub const MONTH_FILE: &str = "low_of_year_month_distribution_bullish.csv";
pub const QUARTER_FILE: &str = "low_of_year_quarter_distribution_bullish.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct MonthRecord {
    pub month: MonthOfYear,
    pub pct: f64,
}

impl CsvRecord for MonthRecord {
    fn headers() -> &'static [&'static str] {
        &["Month_Num", "Pct_Low_Month", "Month_Name"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.month.0.to_string(),
            format!("{:.2}", self.pct),
            self.month.label(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuarterRecord {
    pub quarter: Quarter,
    pub pct: f64,
}

impl CsvRecord for QuarterRecord {
    fn headers() -> &'static [&'static str] {
        &["Quarter", "Pct_Low_Quarter"]
    }

    fn record(&self) -> Vec<String> {
        vec![self.quarter.0.to_string(), format!("{:.2}", self.pct)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyLowsReport {
    pub months: Distribution<MonthOfYear>,
    pub quarters: Distribution<Quarter>,
}

impl YearlyLowsReport {
    pub fn compute(summaries: &[PeriodSummary]) -> Result<Self> {
        let bullish: Vec<&PeriodSummary> = summaries.iter().filter(|s| s.is_bullish()).collect();
        if bullish.is_empty() {
            return Err(DataError::empty("No bullish years found in data.").into());
        }
        Ok(YearlyLowsReport {
            months: Distribution::tabulate(
                bullish.iter().map(|s| MonthOfYear(s.month_of(Extreme::Low))),
                &all_months(),
            ),
            quarters: Distribution::tabulate(
                bullish.iter().map(|s| Quarter(s.quarter_of(Extreme::Low))),
                &all_quarters(),
            ),
        })
    }

    pub fn month_records(&self) -> Vec<MonthRecord> {
        self.months
            .iter()
            .map(|(m, pct)| MonthRecord { month: *m, pct })
            .collect()
    }

    pub fn quarter_records(&self) -> Vec<QuarterRecord> {
        self.quarters
            .iter()
            .map(|(q, pct)| QuarterRecord { quarter: *q, pct })
            .collect()
    }
}

impl Report for YearlyLowsReport {
    fn render(&self) -> String {
        let mut out = String::from("Distribution of Low-of-Year Month (Bullish Years Only):\n");
        for (m, pct) in self.months.iter() {
            let _ = writeln!(out, "  {} ({}): {pct:.2}% of bullish years", m.label(), m.0);
        }
        out.push_str("\nDistribution of Low-of-Year Quarter (Bullish Years Only):\n");
        for (q, pct) in self.quarters.iter() {
            let _ = writeln!(out, "  {}: {pct:.2}% of bullish years", q.label());
        }
        out
    }

    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        let months = config.output_path(MONTH_FILE);
        let quarters = config.output_path(QUARTER_FILE);
        write_csv(&self.month_records(), &months)?;
        write_csv(&self.quarter_records(), &quarters)?;
        Ok(vec![months, quarters])
    }
}

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let bars = load_bars(config, Localization::UtcToReference)?;
    let summaries = summarize_bars(&bars, PeriodKind::Year)?;
    let report = YearlyLowsReport::compute(&summaries)?;
    emit(&report, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::America::New_York;
    use data_engine::Direction;

    fn year(y: i32, direction: Direction, low_month: u32) -> PeriodSummary {
        PeriodSummary {
            period_start: NaiveDate::from_ymd_opt(y, 1, 1).unwrap(),
            direction,
            high_ts: New_York.with_ymd_and_hms(y, 12, 1, 0, 0, 0).unwrap(),
            low_ts: New_York.with_ymd_and_hms(y, low_month, 10, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn month_and_quarter_shares() {
        let r = YearlyLowsReport::compute(&[
            year(2020, Direction::Bullish, 3),
            year(2021, Direction::Bullish, 1),
            year(2022, Direction::Bearish, 10),
            year(2023, Direction::Bullish, 10),
            year(2024, Direction::Bullish, 3),
        ])
        .unwrap();
        assert_eq!(r.months.percent(&MonthOfYear(3)), 50.0);
        assert_eq!(r.months.percent(&MonthOfYear(10)), 25.0);
        assert_eq!(r.quarters.percent(&Quarter(1)), 75.0);
        assert_eq!(r.quarters.percent(&Quarter(2)), 0.0);

        let months = r.month_records();
        assert_eq!(months.len(), 12);
        assert_eq!(months[2].record(), vec!["3", "50.00", "March"]);
        assert_eq!(r.quarter_records()[3].record(), vec!["4", "25.00"]);
    }

    #[test]
    fn no_bullish_year_is_empty_dataset() {
        let err = YearlyLowsReport::compute(&[year(2022, Direction::Bearish, 1)]).unwrap_err();
        assert_eq!(err.to_string(), "No bullish years found in data.");
    }
}
