use chrono::{Month, Weekday};
use data_engine::calendar::weekday_name;
use data_engine::Direction;
use std::fmt::Debug;
use std::hash::Hash;

/// A value that can label a row or column of a percentage table.
pub trait Category: Clone + Eq + Hash + Debug {
    fn label(&self) -> String;

    /// Label for space-constrained console columns.
    fn short_label(&self) -> String {
        self.label()
    }
}

impl Category for Weekday {
    fn label(&self) -> String {
        weekday_name(*self).to_string()
    }

    fn short_label(&self) -> String {
        weekday_name(*self)[..3].to_string()
    }
}

impl Category for Direction {
    fn label(&self) -> String {
        self.as_str().to_string()
    }
}

/// Session names.
impl Category for String {
    fn label(&self) -> String {
        self.clone()
    }
}

/// Hour of day, 0..=23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hour(pub u32);

impl Category for Hour {
    fn label(&self) -> String {
        self.0.to_string()
    }
}

/// Week number within a month, 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekOfMonth(pub u32);

impl Category for WeekOfMonth {
    fn label(&self) -> String {
        self.0.to_string()
    }

    fn short_label(&self) -> String {
        format!("Week {}", self.0)
    }
}

/// Calendar month number, 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthOfYear(pub u32);

impl MonthOfYear {
    pub fn name(&self) -> &'static str {
        u8::try_from(self.0)
            .ok()
            .and_then(|n| Month::try_from(n).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }
}

impl Category for MonthOfYear {
    fn label(&self) -> String {
        self.name().to_string()
    }

    fn short_label(&self) -> String {
        self.name().chars().take(3).collect()
    }
}

/// Calendar quarter, 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quarter(pub u32);

impl Category for Quarter {
    fn label(&self) -> String {
        format!("Q{}", self.0)
    }
}

pub fn all_hours() -> Vec<Hour> {
    (0..24).map(Hour).collect()
}

pub fn all_weeks_of_month() -> Vec<WeekOfMonth> {
    (1..=5).map(WeekOfMonth).collect()
}

pub fn all_months() -> Vec<MonthOfYear> {
    (1..=12).map(MonthOfYear).collect()
}

pub fn all_quarters() -> Vec<Quarter> {
    (1..=4).map(Quarter).collect()
}
