use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

use crate::data_engine::Bar;

/// How a bar's range relates to the previous bar's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarRelation {
    /// `high <= prev_high && low >= prev_low`
    Inside,
    /// `high > prev_high && low < prev_low`
    Outside,
    Neither,
}

impl BarRelation {
    pub fn between(prev: &Bar, bar: &Bar) -> Self {
        if bar.high <= prev.high && bar.low >= prev.low {
            BarRelation::Inside
        } else if bar.high > prev.high && bar.low < prev.low {
            BarRelation::Outside
        } else {
            BarRelation::Neither
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BarRelation::Inside => "Inside",
            BarRelation::Outside => "Outside",
            BarRelation::Neither => "Neither",
        }
    }
}

impl fmt::Display for BarRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub relation: BarRelation,
}

/// Compare every bar with its predecessor. The first bar has none and is dropped,
/// so the output is one shorter than the input.
pub fn classify_bars(bars: &[Bar]) -> Vec<ClassifiedDay> {
    bars.windows(2)
        .map(|pair| {
            let (prev, bar) = (&pair[0], &pair[1]);
            let date = bar.date();
            ClassifiedDay {
                date,
                weekday: date.weekday(),
                relation: BarRelation::between(prev, bar),
            }
        })
        .collect()
}

/// Boolean series aligned with `days`: true where the day has `relation`.
pub fn flag_series(days: &[ClassifiedDay], relation: BarRelation) -> Vec<bool> {
    days.iter().map(|d| d.relation == relation).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use chrono_tz::America::New_York;

    fn bar(day: u32, high: f64, low: f64) -> Bar {
        let naive = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_time(NaiveTime::MIN);
        Bar {
            timestamp: New_York.from_local_datetime(&naive).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 0,
        }
    }

    #[test]
    fn classify_inside_outside() {
        let bars = vec![
            bar(15, 110.0, 100.0),
            bar(16, 108.0, 101.0), // inside
            bar(17, 108.0, 101.0), // equal range is inside
            bar(18, 112.0, 99.0),  // outside
            bar(19, 113.0, 105.0), // neither
        ];
        let days = classify_bars(&bars);
        assert_eq!(days.len(), 4);
        let rel: Vec<_> = days.iter().map(|d| d.relation).collect();
        assert_eq!(
            rel,
            vec![
                BarRelation::Inside,
                BarRelation::Inside,
                BarRelation::Outside,
                BarRelation::Neither
            ]
        );
        assert_eq!(days[0].weekday, Weekday::Tue);
        assert_eq!(flag_series(&days, BarRelation::Outside), vec![false, false, true, false]);
    }

    #[test]
    fn single_bar_has_no_days() {
        assert!(classify_bars(&[bar(15, 2.0, 1.0)]).is_empty());
        assert!(classify_bars(&[]).is_empty());
    }
}
