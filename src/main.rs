use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use stats_engine::{run_all, run_report, AnalysisConfig, FileConfig, ReportKind};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "period-extremes")]
#[command(version, about = "Where weekly, monthly and yearly highs and lows tend to form")]
struct Cli {
    #[command(flatten)]
    opts: CommonOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonOpts {
    /// JSON file with analysis settings; flags below override it
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bars file: Date[Time], Open, High, Low, Close, Volume with no header
    #[arg(short, long, global = true, env = "PERIOD_EXTREMES_INPUT", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Field delimiter of the bars file (single character or "tab")
    #[arg(short, long, global = true)]
    delimiter: Option<String>,

    /// Reference timezone, e.g. America/New_York
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// First day of the week for weekly periods
    #[arg(long, global = true)]
    week_start: Option<String>,

    /// Longest window for inside/outside run lengths
    #[arg(long, global = true)]
    max_run_length: Option<usize>,

    /// Directory for the generated CSV tables
    #[arg(short, long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Weekly summary file (written by weekly-summary, read by weekday-distribution)
    #[arg(long, global = true, value_name = "FILE")]
    summary: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Classify each week and record the weekday of its high and low
    WeeklySummary,
    /// Weekday distribution of weekly highs/lows from a weekly summary
    WeekdayDistribution,
    /// Weekday x session and hour of weekly highs/lows (intraday data)
    WeeklySessions,
    /// Week-of-month and weekday of the low in bullish months
    MonthlyLows,
    /// Month and quarter of the low in bullish years
    YearlyLows,
    /// Inside/outside bar weekday odds and run lengths
    InsideOutside,
    /// Run every report in turn
    All,
}

impl Commands {
    fn kind(self) -> Option<ReportKind> {
        match self {
            Commands::WeeklySummary => Some(ReportKind::WeeklySummary),
            Commands::WeekdayDistribution => Some(ReportKind::WeekdayDistribution),
            Commands::WeeklySessions => Some(ReportKind::WeeklySessions),
            Commands::MonthlyLows => Some(ReportKind::MonthlyLows),
            Commands::YearlyLows => Some(ReportKind::YearlyLows),
            Commands::InsideOutside => Some(ReportKind::InsideOutside),
            Commands::All => None,
        }
    }
}

fn build_config(opts: &CommonOpts) -> anyhow::Result<AnalysisConfig> {
    let base = match &opts.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let overrides = FileConfig {
        input: opts.input.clone(),
        delimiter: opts.delimiter.clone(),
        timezone: opts.timezone.clone(),
        week_start: opts.week_start.clone(),
        max_run_length: opts.max_run_length,
        output_dir: opts.output_dir.clone(),
        summary: opts.summary.clone(),
        ..FileConfig::default()
    };
    Ok(base.apply(overrides)?)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli.opts)?;
    if !config.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("creating {}", config.output_dir.display()))?;
    }

    match cli.command.kind() {
        Some(kind) => {
            info!(report = %kind, input = %config.source.path.display(), "running report");
            match run_report(kind, &config) {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => println!("{e}"),
                Err(e) => return Err(e).with_context(|| format!("{kind} failed")),
            }
        }
        None => {
            let outcome = run_all(&config)?;
            info!(
                completed = outcome.completed.len(),
                skipped = outcome.skipped.len(),
                failed = outcome.failed.len(),
                files = outcome.saved.len(),
                "all reports finished"
            );
            for (kind, reason) in &outcome.skipped {
                println!("skipped {kind}: {reason}");
            }
            if !outcome.failed.is_empty() {
                let names: Vec<String> = outcome.failed.iter().map(|(k, _)| k.to_string()).collect();
                anyhow::bail!("{} report(s) failed: {}", names.len(), names.join(", "));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
