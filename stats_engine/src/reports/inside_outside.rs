//! Inside and outside bars: how often each weekday produces one, and how likely a
//! run of consecutive inside (or outside) days is.

use chrono::Weekday;
use data_engine::{
    classify_bars, flag_series, write_csv, BarRelation, ClassifiedDay, CsvRecord, DataError,
    Localization,
};
use std::fmt::Write;
use std::path::PathBuf;

use super::{emit, load_bars, Report};
use crate::category::Category;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::frequency::percent_of;
use crate::run_length::{format_percent, run_length_probs};

pub const WEEKDAY_FILE: &str = "inside_outside_weekday_probs.csv";
pub const RUN_LENGTH_FILE: &str = "inside_outside_run_lengths.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayRow {
    pub weekday: Weekday,
    pub total_days: usize,
    pub inside_days: usize,
    pub outside_days: usize,
}

impl WeekdayRow {
    /// `None` when the weekday has no days at all.
    pub fn pct_inside(&self) -> Option<f64> {
        share(self.inside_days, self.total_days)
    }

    pub fn pct_outside(&self) -> Option<f64> {
        share(self.outside_days, self.total_days)
    }
}

fn share(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| percent_of(count, total))
}

impl CsvRecord for WeekdayRow {
    fn headers() -> &'static [&'static str] {
        &["Weekday", "Total_Days", "Inside_Days", "Pct_Inside", "Outside_Days", "Pct_Outside"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.weekday.label(),
            self.total_days.to_string(),
            self.inside_days.to_string(),
            format_percent(self.pct_inside()),
            self.outside_days.to_string(),
            format_percent(self.pct_outside()),
        ]
    }
}

/// Inside and outside run-length probabilities for one window length.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLengthRow {
    pub window: usize,
    pub inside: Option<f64>,
    pub outside: Option<f64>,
}

impl CsvRecord for RunLengthRow {
    fn headers() -> &'static [&'static str] {
        &["Length", "Pct_Inside_Streak", "Pct_Outside_Streak"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.window.to_string(),
            format_percent(self.inside),
            format_percent(self.outside),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsideOutsideReport {
    pub weekdays: Vec<WeekdayRow>,
    pub runs: Vec<RunLengthRow>,
}

impl InsideOutsideReport {
    pub fn compute(days: &[ClassifiedDay], trading_days: &[Weekday], max_run: usize) -> Result<Self> {
        if days.is_empty() {
            return Err(
                DataError::empty("Need at least two bars to compare inside/outside days.").into(),
            );
        }

        let mut domain = trading_days.to_vec();
        for d in days {
            if !domain.contains(&d.weekday) {
                domain.push(d.weekday);
            }
        }
        let weekdays = domain
            .into_iter()
            .map(|weekday| {
                let on_day = days.iter().filter(|d| d.weekday == weekday);
                WeekdayRow {
                    weekday,
                    total_days: on_day.clone().count(),
                    inside_days: on_day.clone().filter(|d| d.relation == BarRelation::Inside).count(),
                    outside_days: on_day.filter(|d| d.relation == BarRelation::Outside).count(),
                }
            })
            .collect();

        let inside = run_length_probs(&flag_series(days, BarRelation::Inside), max_run);
        let outside = run_length_probs(&flag_series(days, BarRelation::Outside), max_run);
        let runs = inside
            .iter()
            .zip(&outside)
            .map(|(i, o)| RunLengthRow {
                window: i.window,
                inside: i.percent,
                outside: o.percent,
            })
            .collect();

        Ok(InsideOutsideReport { weekdays, runs })
    }
}

impl Report for InsideOutsideReport {
    fn render(&self) -> String {
        let mut out = String::from("=== Weekday probabilities ===\n");
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:>11} {:>10} {:>12} {:>11}",
            "Weekday", "Total_Days", "Inside_Days", "Pct_Inside", "Outside_Days", "Pct_Outside"
        );
        for row in &self.weekdays {
            let _ = writeln!(
                out,
                "{:<10} {:>10} {:>11} {:>10} {:>12} {:>11}",
                row.weekday.label(),
                row.total_days,
                row.inside_days,
                format_percent(row.pct_inside()),
                row.outside_days,
                format_percent(row.pct_outside())
            );
        }

        out.push_str("\n=== Run-length probabilities (in % of N-day windows) ===\n");
        out.push_str("Length | Inside-streak | Outside-streak\n");
        let _ = writeln!(out, "{}", "-".repeat(38));
        let cell = |p: Option<f64>| match p {
            Some(v) => format!("{v:5.2}%"),
            None => "  N/A".to_string(),
        };
        for row in &self.runs {
            let _ = writeln!(
                out,
                "  {:>1}    |    {:>6}    |    {:>6}",
                row.window,
                cell(row.inside),
                cell(row.outside)
            );
        }
        out
    }

    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        let weekdays = config.output_path(WEEKDAY_FILE);
        let runs = config.output_path(RUN_LENGTH_FILE);
        write_csv(&self.weekdays, &weekdays)?;
        write_csv(&self.runs, &runs)?;
        Ok(vec![weekdays, runs])
    }
}

/// Date-only input keeps its calendar days. Intraday input is still converted from UTC.
pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let bars = load_bars(config, Localization::ReferenceWall)?;
    let days = classify_bars(&bars);
    let report = InsideOutsideReport::compute(&days, &config.trading_days, config.max_run_length)?;
    emit(&report, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use data_engine::TRADING_WEEKDAYS;

    fn day(d: u32, relation: BarRelation) -> ClassifiedDay {
        let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        ClassifiedDay { date, weekday: date.weekday(), relation }
    }

    #[test]
    fn weekday_counts_and_runs() {
        // Tue..Fri then Mon
        let days = vec![
            day(16, BarRelation::Inside),
            day(17, BarRelation::Inside),
            day(18, BarRelation::Outside),
            day(19, BarRelation::Neither),
            day(22, BarRelation::Inside),
        ];
        let r = InsideOutsideReport::compute(&days, &TRADING_WEEKDAYS, 4).unwrap();

        let mon = &r.weekdays[0];
        assert_eq!((mon.weekday, mon.total_days, mon.inside_days), (Weekday::Mon, 1, 1));
        assert_eq!(mon.pct_inside(), Some(100.0));
        assert_eq!(r.weekdays[3].pct_outside(), Some(100.0));
        assert_eq!(r.weekdays.len(), 5);

        assert_eq!(r.runs.len(), 3);
        assert_eq!(r.runs[0].inside, Some(25.0));
        assert_eq!(r.runs[0].outside, Some(0.0));
        assert_eq!(r.runs[2].inside, Some(0.0));
    }

    #[test]
    fn weekday_without_days_reports_not_available() {
        let days = vec![day(16, BarRelation::Inside)];
        let r = InsideOutsideReport::compute(&days, &TRADING_WEEKDAYS, 4).unwrap();
        assert_eq!(r.weekdays[0].pct_inside(), None);
        assert_eq!(r.weekdays[0].record()[3], "N/A");
        assert_eq!(r.runs[0].inside, None);
        assert!(r.render().contains("  N/A"));
    }

    #[test]
    fn no_comparable_days_is_empty_dataset() {
        let err = InsideOutsideReport::compute(&[], &TRADING_WEEKDAYS, 4).unwrap_err();
        assert!(err.is_recoverable());
    }
}
