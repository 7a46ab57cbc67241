use chrono::{Datelike, NaiveDate, Weekday};

use crate::data_engine::Bar;

/// Calendar unit used to group bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    Week { start: Weekday },
    Month,
    Year,
}

impl PeriodKind {
    /// Weeks running Monday to Sunday.
    pub const fn weekly() -> Self {
        PeriodKind::Week { start: Weekday::Mon }
    }

    /// Canonical first day of the unit containing `date`, whether or not any bar
    /// exists on that day.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            PeriodKind::Week { start } => date.week(*start).first_day(),
            PeriodKind::Month => date.with_day(1).unwrap_or(date),
            PeriodKind::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodKind::Week { .. } => "week",
            PeriodKind::Month => "month",
            PeriodKind::Year => "year",
        }
    }
}

/// A run of consecutive bars that share one calendar unit. Borrowed from the
/// loaded bar sequence and never stored.
#[derive(Debug, Clone, Copy)]
pub struct Period<'a> {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub bars: &'a [Bar],
}

impl<'a> Period<'a> {
    pub fn first(&self) -> Option<&'a Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&'a Bar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Split `bars` (ascending by timestamp) into non-empty periods in ascending
/// start order. Every bar lands in exactly one period.
pub fn bucket_periods(bars: &[Bar], kind: PeriodKind) -> Vec<Period<'_>> {
    bars.chunk_by(|a, b| kind.period_start(a.date()) == kind.period_start(b.date()))
        .map(|chunk| Period {
            kind,
            start: kind.period_start(chunk[0].date()),
            bars: chunk,
        })
        .collect()
}

pub const TRADING_WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Exact, case-sensitive full English weekday name.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Mon),
        "Tuesday" => Some(Weekday::Tue),
        "Wednesday" => Some(Weekday::Wed),
        "Thursday" => Some(Weekday::Thu),
        "Friday" => Some(Weekday::Fri),
        "Saturday" => Some(Weekday::Sat),
        "Sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use chrono_tz::America::New_York;

    fn bar_on(y: i32, m: u32, d: u32) -> Bar {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN);
        Bar {
            timestamp: New_York.from_local_datetime(&naive).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn two_iso_weeks_make_two_periods() {
        // Wed 2024-01-10 .. Tue 2024-01-16
        let bars: Vec<Bar> = (10..=16).map(|d| bar_on(2024, 1, d)).collect();
        let periods = bucket_periods(&bars, PeriodKind::weekly());

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start, date(2024, 1, 8));
        assert_eq!(periods[1].start, date(2024, 1, 15));
        assert_eq!(periods[0].len() + periods[1].len(), bars.len());
        for p in &periods {
            let end = p.start + chrono::Days::new(7);
            assert!(p.bars.iter().all(|b| b.date() >= p.start && b.date() < end));
        }
    }

    #[test]
    fn week_start_is_configurable() {
        let kind = PeriodKind::Week { start: Weekday::Sun };
        assert_eq!(kind.period_start(date(2024, 1, 10)), date(2024, 1, 7));
        assert_eq!(kind.period_start(date(2024, 1, 7)), date(2024, 1, 7));
    }

    #[test]
    fn months_and_years_use_first_day() {
        let bars = vec![
            bar_on(2023, 12, 29),
            bar_on(2024, 1, 2),
            bar_on(2024, 1, 31),
            bar_on(2024, 2, 1),
        ];
        let months = bucket_periods(&bars, PeriodKind::Month);
        let starts: Vec<_> = months.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![date(2023, 12, 1), date(2024, 1, 1), date(2024, 2, 1)]);
        assert_eq!(months[1].len(), 2);

        let years = bucket_periods(&bars, PeriodKind::Year);
        assert_eq!(years.len(), 2);
        assert_eq!(years[1].start, date(2024, 1, 1));
        assert_eq!(years[1].len(), 3);
        assert_eq!(years[1].kind.label(), "year");
        assert_eq!(months[0].kind.label(), "month");
    }

    #[test]
    fn empty_input_has_no_periods() {
        assert!(bucket_periods(&[], PeriodKind::Month).is_empty());
    }

    #[test]
    fn weekday_names_are_exact() {
        assert_eq!(weekday_from_name("Thursday"), Some(Weekday::Thu));
        assert_eq!(weekday_from_name("thursday"), None);
        assert_eq!(weekday_from_name("Thu"), None);
        for d in TRADING_WEEKDAYS {
            assert_eq!(weekday_from_name(weekday_name(d)), Some(d));
        }
    }
}
