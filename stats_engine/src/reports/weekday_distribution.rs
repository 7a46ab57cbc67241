//! Given a weekly summary, how often the week's low and high fall on each weekday,
//! split by bullish and bearish weeks.

use chrono::Weekday;
use data_engine::{read_weekly_table, Direction, Extreme, WeeklySummaryRow};
use std::fmt::Write;
use std::path::PathBuf;

use super::{emit, Report};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::frequency::{Distribution, FrequencyTable};
use crate::render::conditional_table;

pub const LOW_DAY_FILE: &str = "low_day_distribution_by_week_type.csv";
pub const HIGH_DAY_FILE: &str = "high_day_distribution_by_week_type.csv";
const INDEX_NAME: &str = "Week_Type";

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayDistributionReport {
    pub overall: Distribution<Direction>,
    pub low_day: FrequencyTable<Direction, Weekday>,
    pub high_day: FrequencyTable<Direction, Weekday>,
}

impl WeekdayDistributionReport {
    pub fn compute(rows: &[WeeklySummaryRow], days: &[Weekday]) -> Self {
        let by_day = |extreme: Extreme| {
            FrequencyTable::tabulate(
                rows.iter().map(|r| (r.direction, r.day_of(extreme))),
                &Direction::ALL,
                days,
            )
        };
        WeekdayDistributionReport {
            overall: Distribution::tabulate(rows.iter().map(|r| r.direction), &Direction::ALL),
            low_day: by_day(Extreme::Low),
            high_day: by_day(Extreme::High),
        }
    }
}

impl Report for WeekdayDistributionReport {
    fn render(&self) -> String {
        let mut out = String::from("Overall distribution of weeks:\n");
        for (dir, pct) in self.overall.iter() {
            let _ = writeln!(out, "  {dir}: {pct:.2}% ({} weeks)", self.overall.count(dir));
        }
        let _ = writeln!(out, "\nChance the weekly LOW formed on each weekday:\n");
        out.push_str(&conditional_table(&self.low_day, "Week Type"));
        let _ = writeln!(out, "\nChance the weekly HIGH formed on each weekday:\n");
        out.push_str(&conditional_table(&self.high_day, "Week Type"));
        out
    }

    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        let low = config.output_path(LOW_DAY_FILE);
        let high = config.output_path(HIGH_DAY_FILE);
        self.low_day.write_csv(&low, INDEX_NAME)?;
        self.high_day.write_csv(&high, INDEX_NAME)?;
        Ok(vec![low, high])
    }
}

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let rows = read_weekly_table(&config.summary_path)?;
    let report = WeekdayDistributionReport::compute(&rows, &config.trading_days);
    emit(&report, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use data_engine::TRADING_WEEKDAYS;

    fn row(direction: Direction, high_day: Weekday, low_day: Weekday) -> WeeklySummaryRow {
        WeeklySummaryRow {
            week_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            direction,
            high_day,
            low_day,
        }
    }

    #[test]
    fn conditional_low_and_high_days() {
        let rows = vec![
            row(Direction::Bullish, Weekday::Fri, Weekday::Mon),
            row(Direction::Bullish, Weekday::Thu, Weekday::Mon),
            row(Direction::Bullish, Weekday::Fri, Weekday::Tue),
            row(Direction::Bearish, Weekday::Mon, Weekday::Fri),
        ];
        let r = WeekdayDistributionReport::compute(&rows, &TRADING_WEEKDAYS);

        assert_eq!(r.overall.percent(&Direction::Bullish), 75.0);
        assert_eq!(r.overall.count(&Direction::Bearish), 1);
        assert_eq!(r.low_day.percent(&Direction::Bullish, &Weekday::Mon), 66.67);
        assert_eq!(r.low_day.percent(&Direction::Bullish, &Weekday::Wed), 0.0);
        assert_eq!(r.high_day.percent(&Direction::Bearish, &Weekday::Mon), 100.0);

        let text = r.render();
        assert!(text.contains("  Bullish: 75.00% (3 weeks)"));
        assert!(text.contains("Chance the weekly LOW formed on each weekday:"));
    }
}
