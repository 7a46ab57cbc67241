//! The six analyses. Each loads its own input, prints its tables to stdout and
//! saves flat CSV files next to the configured output directory.

pub mod inside_outside;
pub mod monthly_lows;
pub mod weekday_distribution;
pub mod weekly_sessions;
pub mod weekly_summary;
pub mod yearly_lows;

use data_engine::{Bar, DataEngine, Localization};
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::AnalysisConfig;
use crate::error::Result;

/// A computed analysis, ready to print and persist.
pub trait Report {
    fn render(&self) -> String;
    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>>;
}

/// Print `report` and write its files.
pub fn emit<R: Report>(report: &R, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    println!("{}", report.render());
    let saved = report.save(config)?;
    for path in &saved {
        println!("Saved → {}", path.display());
        info!(path = %path.display(), "saved");
    }
    Ok(saved)
}

pub(crate) fn load_bars(config: &AnalysisConfig, localization: Localization) -> Result<Vec<Bar>> {
    let engine = DataEngine::new(config.source_with(localization));
    Ok(engine.fetch_from_csv()?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    WeeklySummary,
    WeekdayDistribution,
    WeeklySessions,
    MonthlyLows,
    YearlyLows,
    InsideOutside,
}

impl ReportKind {
    /// Run order for `all`: the weekly summary feeds the weekday distribution.
    pub const ALL: [ReportKind; 6] = [
        ReportKind::WeeklySummary,
        ReportKind::WeekdayDistribution,
        ReportKind::WeeklySessions,
        ReportKind::MonthlyLows,
        ReportKind::YearlyLows,
        ReportKind::InsideOutside,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::WeeklySummary => "weekly-summary",
            ReportKind::WeekdayDistribution => "weekday-distribution",
            ReportKind::WeeklySessions => "weekly-sessions",
            ReportKind::MonthlyLows => "monthly-lows",
            ReportKind::YearlyLows => "yearly-lows",
            ReportKind::InsideOutside => "inside-outside",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn run_report(kind: ReportKind, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    match kind {
        ReportKind::WeeklySummary => weekly_summary::run(config),
        ReportKind::WeekdayDistribution => weekday_distribution::run(config),
        ReportKind::WeeklySessions => weekly_sessions::run(config),
        ReportKind::MonthlyLows => monthly_lows::run(config),
        ReportKind::YearlyLows => yearly_lows::run(config),
        ReportKind::InsideOutside => inside_outside::run(config),
    }
}

#[derive(Debug, Default)]
pub struct RunOutcome {
    pub completed: Vec<ReportKind>,
    pub skipped: Vec<(ReportKind, String)>,
    /// Reports that hit an error other than an empty dataset, e.g. an unwritable
    /// output file.
    pub failed: Vec<(ReportKind, String)>,
    pub saved: Vec<PathBuf>,
}

/// Run every report in order. Only a missing input stops the run. Empty datasets
/// land in `skipped` and any other error in `failed`.
pub fn run_all(config: &AnalysisConfig) -> Result<RunOutcome> {
    let mut outcome = RunOutcome::default();
    for kind in ReportKind::ALL {
        if kind == ReportKind::WeekdayDistribution
            && !outcome.completed.contains(&ReportKind::WeeklySummary)
        {
            outcome
                .skipped
                .push((kind, "weekly summary was not produced".to_string()));
            continue;
        }

        println!("\n##### {kind} #####\n");
        match run_report(kind, config) {
            Ok(saved) => {
                outcome.completed.push(kind);
                outcome.saved.extend(saved);
            }
            Err(e) if e.is_recoverable() => {
                println!("{e}");
                warn!(report = %kind, "skipped: {e}");
                outcome.skipped.push((kind, e.to_string()));
            }
            Err(e) if e.is_source_not_found() => return Err(e),
            Err(e) => {
                println!("{kind} failed: {e}");
                error!(report = %kind, "failed: {e}");
                outcome.failed.push((kind, e.to_string()));
            }
        }
    }
    Ok(outcome)
}
