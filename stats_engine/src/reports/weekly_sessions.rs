//! For intraday data: which weekday and session, and which hour, held each week's
//! low and high, split by bullish and bearish weeks.

use chrono::Weekday;
use data_engine::{
    summarize_bars, DataError, Direction, Extreme, Localization, PeriodSummary, SessionDefinition,
};
use std::fmt::Write;
use std::path::PathBuf;

use super::{emit, load_bars, Report};
use crate::category::{all_hours, Category, Hour};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::frequency::{FrequencyTable, JointTable};
use crate::render::{distribution_lines, joint_grid};

const INDEX_NAME: &str = "Week_Type";

/// Where one kind of weekly extreme formed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeTiming {
    pub extreme: Extreme,
    pub sessions: JointTable<Direction, Weekday, String>,
    pub hours: FrequencyTable<Direction, Hour>,
}

impl ExtremeTiming {
    pub fn compute(
        summaries: &[PeriodSummary],
        extreme: Extreme,
        sessions: &SessionDefinition,
        days: &[Weekday],
    ) -> Self {
        let joint = summaries.iter().map(|s| {
            let ts = s.timestamp_of(extreme);
            (
                s.direction,
                s.weekday_of(extreme),
                sessions.classify_timestamp(&ts).to_string(),
            )
        });
        let hours = summaries
            .iter()
            .map(|s| (s.direction, Hour(s.hour_of(extreme))));

        ExtremeTiming {
            extreme,
            sessions: JointTable::tabulate(joint, &Direction::ALL, days, &sessions.names()),
            hours: FrequencyTable::tabulate(hours, &Direction::ALL, &all_hours()),
        }
    }

    fn file_stem(&self) -> String {
        format!("{}_of_week", self.extreme.as_str().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySessionsReport {
    pub low: ExtremeTiming,
    pub high: ExtremeTiming,
}

impl WeeklySessionsReport {
    pub fn compute(
        summaries: &[PeriodSummary],
        sessions: &SessionDefinition,
        days: &[Weekday],
    ) -> Result<Self> {
        if summaries.is_empty() {
            return Err(DataError::empty("No weeks found in data.").into());
        }
        Ok(WeeklySessionsReport {
            low: ExtremeTiming::compute(summaries, Extreme::Low, sessions, days),
            high: ExtremeTiming::compute(summaries, Extreme::High, sessions, days),
        })
    }
}

impl Report for WeeklySessionsReport {
    fn render(&self) -> String {
        let mut out = String::new();
        for direction in Direction::ALL {
            for timing in [&self.low, &self.high] {
                let name = timing.extreme.as_str();
                if let Some(dist) = timing.sessions.group(&direction) {
                    let _ = writeln!(
                        out,
                        "\n=== {name}-of-Week sessions for {} weeks (in % of these weeks, n={}) ===",
                        direction.label(),
                        dist.total()
                    );
                    out.push_str(&joint_grid(&timing.sessions, dist));
                }
                if let Some(dist) = timing.hours.group(&direction) {
                    let _ = writeln!(
                        out,
                        "\n=== {name}-of-Week hours for {} weeks (hour of day, in % of these weeks) ===",
                        direction.label()
                    );
                    out.push_str(&distribution_lines(dist, ""));
                }
            }
        }
        out
    }

    fn save(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        for timing in [&self.low, &self.high] {
            let stem = timing.file_stem();
            let sessions = config.output_path(&format!("{stem}_sessions.csv"));
            timing.sessions.write_csv(&sessions, INDEX_NAME, "Weekday")?;
            saved.push(sessions);

            let hours = config.output_path(&format!("{stem}_hours.csv"));
            timing.hours.write_csv(&hours, INDEX_NAME)?;
            saved.push(hours);
        }
        Ok(saved)
    }
}

/// Intraday timestamps are UTC and get converted to the reference timezone.
pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let bars = load_bars(config, Localization::UtcToReference)?;
    let summaries = summarize_bars(&bars, config.week_kind())?;
    let report = WeeklySessionsReport::compute(&summaries, &config.sessions, &config.trading_days)?;
    emit(&report, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::America::New_York;
    use data_engine::TRADING_WEEKDAYS;

    fn summary(direction: Direction, high: (u32, u32, u32), low: (u32, u32, u32)) -> PeriodSummary {
        PeriodSummary {
            period_start: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            direction,
            high_ts: New_York.with_ymd_and_hms(2024, 1, high.0, high.1, high.2, 0).unwrap(),
            low_ts: New_York.with_ymd_and_hms(2024, 1, low.0, low.1, low.2, 0).unwrap(),
        }
    }

    #[test]
    fn sessions_and_hours_per_direction() {
        let summaries = vec![
            // low Monday 09:45 (NY Morning), high Friday 13:00 (NY Afternoon)
            summary(Direction::Bullish, (19, 13, 0), (15, 9, 45)),
            // low Monday 02:00 (London), high Thursday 23:30 (Other)
            summary(Direction::Bullish, (18, 23, 30), (15, 2, 0)),
            summary(Direction::Bearish, (15, 20, 0), (17, 14, 0)),
        ];
        let r = WeeklySessionsReport::compute(&summaries, &SessionDefinition::default(), &TRADING_WEEKDAYS)
            .unwrap();

        let bull_low = r.low.sessions.group(&Direction::Bullish).unwrap();
        assert_eq!(bull_low.percent(&Weekday::Mon, &"New York Morning".to_string()), 50.0);
        assert_eq!(bull_low.percent(&Weekday::Mon, &"London".to_string()), 50.0);

        let bull_high = r.high.sessions.group(&Direction::Bullish).unwrap();
        assert_eq!(bull_high.percent(&Weekday::Thu, &"Other".to_string()), 50.0);

        assert_eq!(r.low.hours.percent(&Direction::Bullish, &Hour(9)), 50.0);
        assert_eq!(r.low.hours.percent(&Direction::Bullish, &Hour(3)), 0.0);
        assert_eq!(r.high.hours.percent(&Direction::Bearish, &Hour(20)), 100.0);
        assert_eq!(r.low.hours.categories().len(), 24);
        assert_eq!(r.low.sessions.cols().len(), 5);
    }

    #[test]
    fn no_weeks_is_empty_dataset() {
        let err = WeeklySessionsReport::compute(&[], &SessionDefinition::default(), &TRADING_WEEKDAYS)
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
