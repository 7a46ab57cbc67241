use chrono::{DateTime, Datelike, NaiveDate, Timelike, Weekday};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::calendar::{bucket_periods, Period, PeriodKind};
use crate::data_engine::Bar;
use crate::error::{DataError, Result};

/// Period close versus period open. A close equal to the open counts as bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Bullish, Direction::Bearish];

    pub fn from_open_close(open: f64, close: f64) -> Self {
        if close > open {
            Direction::Bullish
        } else {
            Direction::Bearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bullish => "Bullish",
            Direction::Bearish => "Bearish",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Bullish" => Ok(Direction::Bullish),
            "Bearish" => Ok(Direction::Bearish),
            other => Err(format!("'{other}' is neither Bullish nor Bearish")),
        }
    }
}

/// Which extreme of a period to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extreme {
    High,
    Low,
}

impl Extreme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Extreme::High => "High",
            Extreme::Low => "Low",
        }
    }
}

/// Reduced view of one period. Calendar attributes of the extremes are derived on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub period_start: NaiveDate,
    pub direction: Direction,
    pub high_ts: DateTime<Tz>,
    pub low_ts: DateTime<Tz>,
}

impl PeriodSummary {
    pub fn is_bullish(&self) -> bool {
        self.direction == Direction::Bullish
    }

    pub fn timestamp_of(&self, extreme: Extreme) -> DateTime<Tz> {
        match extreme {
            Extreme::High => self.high_ts,
            Extreme::Low => self.low_ts,
        }
    }

    pub fn weekday_of(&self, extreme: Extreme) -> Weekday {
        self.timestamp_of(extreme).weekday()
    }

    /// 1..=12
    pub fn month_of(&self, extreme: Extreme) -> u32 {
        self.timestamp_of(extreme).month()
    }

    /// 1..=4
    pub fn quarter_of(&self, extreme: Extreme) -> u32 {
        (self.month_of(extreme) - 1) / 3 + 1
    }

    /// Day-of-month bucket: days 1-7 are week 1, 8-14 week 2, and so on up to 5.
    pub fn week_of_month(&self, extreme: Extreme) -> u32 {
        (self.timestamp_of(extreme).day() - 1) / 7 + 1
    }

    pub fn hour_of(&self, extreme: Extreme) -> u32 {
        self.timestamp_of(extreme).hour()
    }
}

/// Reduce one period. Direction compares the first bar's open with the last bar's
/// close; on tied highs or lows the earliest bar wins.
pub fn summarize_period(period: &Period<'_>) -> Result<PeriodSummary> {
    let (first, last) = match (period.first(), period.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(DataError::EmptyPeriod),
    };

    let mut high_bar = first;
    let mut low_bar = first;
    for bar in period.bars.iter().skip(1) {
        if bar.high > high_bar.high {
            high_bar = bar;
        }
        if bar.low < low_bar.low {
            low_bar = bar;
        }
    }

    let summary = PeriodSummary {
        period_start: period.start,
        direction: Direction::from_open_close(first.open, last.close),
        high_ts: high_bar.timestamp,
        low_ts: low_bar.timestamp,
    };
    debug!(
        kind = period.kind.label(),
        start = %summary.period_start,
        direction = %summary.direction,
        high = %summary.high_ts,
        low = %summary.low_ts,
        "period reduced"
    );
    Ok(summary)
}

/// Bucket `bars` by `kind` and reduce every resulting period.
pub fn summarize_bars(bars: &[Bar], kind: PeriodKind) -> Result<Vec<PeriodSummary>> {
    bucket_periods(bars, kind)
        .iter()
        .map(summarize_period)
        .collect()
}
