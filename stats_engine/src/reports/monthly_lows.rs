//! Bullish months only: which week of the month, and which weekday within that
//! week, held the month's low.

use chrono::Weekday;
use data_engine::{
    summarize_bars, CsvRecord, DataError, Extreme, Localization, PeriodKind, PeriodSummary,
};
use std::fmt::Write;
use std::path::PathBuf;

use super::{emit, load_bars, Report};
use crate::category::{all_weeks_of_month, Category, WeekOfMonth};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::frequency::{Distribution, FrequencyTable};

pub const OUTPUT_FILE: &str = "monthly_low_week_and_weekday_distribution_bullish.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyLowRecord {
    pub week: WeekOfMonth,
    pub overall_week_pct: f64,
    pub weekday: Weekday,
    pub weekday_pct_within_week: f64,
}

impl CsvRecord for MonthlyLowRecord {
    fn headers() -> &'static [&'static str] {
        &["WeekNumInMonth", "OverallWeekPct", "Low_Weekday", "WeekdayPctWithinWeek"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.week.label(),
            format!("{:.2}", self.overall_week_pct),
            self.weekday.label(),
            format!("{:.2}", self.weekday_pct_within_week),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyLowsReport {
    pub weeks: Distribution<WeekOfMonth>,
    pub weekdays: FrequencyTable<WeekOfMonth, Weekday>,
}

impl MonthlyLowsReport {
    /// Bearish months are filtered out here, not by the reducer.
    pub fn compute(summaries: &[PeriodSummary], days: &[Weekday]) -> Result<Self> {
        let bullish: Vec<&PeriodSummary> = summaries.iter().filter(|s| s.is_bullish()).collect();
        if bullish.is_empty() {
            return Err(DataError::empty("No bullish months found in data.").into());
        }

        let weeks = all_weeks_of_month();
        let observed = bullish
            .iter()
            .map(|s| (WeekOfMonth(s.week_of_month(Extreme::Low)), s.weekday_of(Extreme::Low)));

        Ok(MonthlyLowsReport {
            weeks: Distribution::tabulate(
                bullish.iter().map(|s| WeekOfMonth(s.week_of_month(Extreme::Low))),
                &weeks,
            ),
            weekdays: FrequencyTable::tabulate(observed, &weeks, days),
        })
    }

    pub fn records(&self) -> Vec<MonthlyLowRecord> {
        let mut out = Vec::new();
        for (week, dist) in self.weekdays.groups() {
            for (weekday, pct) in dist.iter() {
                out.push(MonthlyLowRecord {
                    week: *week,
                    overall_week_pct: self.weeks.percent(week),
                    weekday: *weekday,
                    weekday_pct_within_week: pct,
                });
            }
        }
        out
    }
}

impl Report for MonthlyLowsReport {
    fn render(&self) -> String {
        let mut out = String::from("Overall Low-of-Month Week Distribution (Bullish Months Only):\n");
        for (week, pct) in self.weeks.iter() {
            let _ = writeln!(out, "  {}: {pct:.2}% of bullish months", week.short_label());
        }

        out.push_str("\nWithin-Week Low-of-Month Weekday Distribution:\n");
        for (week, dist) in self.weekdays.groups() {
            if dist.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{} (n={} months):", week.short_label(), dist.total());
            for (weekday, pct) in dist.iter() {
                let _ = writeln!(out, "  {}: {pct:.2}%", weekday.label());
            }
        }
        out
    }

    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        let path = config.output_path(OUTPUT_FILE);
        data_engine::write_csv(&self.records(), &path)?;
        Ok(vec![path])
    }
}

/// Daily timestamps go through the default UTC conversion.
pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let bars = load_bars(config, Localization::UtcToReference)?;
    let summaries = summarize_bars(&bars, PeriodKind::Month)?;
    let report = MonthlyLowsReport::compute(&summaries, &config.trading_days)?;
    emit(&report, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::America::New_York;
    use data_engine::{Direction, TRADING_WEEKDAYS};

    fn month(direction: Direction, low: (u32, u32)) -> PeriodSummary {
        PeriodSummary {
            period_start: NaiveDate::from_ymd_opt(2024, low.0, 1).unwrap(),
            direction,
            high_ts: New_York.with_ymd_and_hms(2024, low.0, 28, 0, 0, 0).unwrap(),
            low_ts: New_York.with_ymd_and_hms(2024, low.0, low.1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn weeks_and_weekdays_for_bullish_months() {
        let summaries = vec![
            month(Direction::Bullish, (1, 2)),  // Tue, week 1
            month(Direction::Bullish, (2, 5)),  // Mon, week 1
            month(Direction::Bullish, (3, 12)), // Tue, week 2
            month(Direction::Bearish, (4, 30)), // ignored
        ];
        let r = MonthlyLowsReport::compute(&summaries, &TRADING_WEEKDAYS).unwrap();
        assert_eq!(r.weeks.total(), 3);
        assert_eq!(r.weeks.percent(&WeekOfMonth(1)), 66.67);
        assert_eq!(r.weeks.percent(&WeekOfMonth(5)), 0.0);
        assert_eq!(r.weekdays.percent(&WeekOfMonth(1), &Weekday::Tue), 50.0);
        assert_eq!(r.weekdays.percent(&WeekOfMonth(2), &Weekday::Tue), 100.0);

        let records = r.records();
        assert_eq!(records.len(), 5 * 5);
        assert_eq!(
            records[1].record(),
            vec!["1", "66.67", "Tuesday", "50.00"]
        );
    }

    #[test]
    fn no_bullish_month_is_empty_dataset() {
        let err = MonthlyLowsReport::compute(&[month(Direction::Bearish, (1, 2))], &TRADING_WEEKDAYS)
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "No bullish months found in data.");
    }
}
