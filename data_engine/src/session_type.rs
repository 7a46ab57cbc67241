use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;

use crate::error::DataError;

/// Name reported for a time that no configured window covers.
pub const OTHER_SESSION: &str = "Other";

/// A named half-open window `[start, end)` of local time in the reference timezone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSessionWindow")]
pub struct SessionWindow {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Deserialize)]
struct RawSessionWindow {
    name: String,
    start: String,
    end: String,
}

impl TryFrom<RawSessionWindow> for SessionWindow {
    type Error = DataError;

    fn try_from(raw: RawSessionWindow) -> Result<Self, Self::Error> {
        SessionWindow::new(raw.name, &raw.start, &raw.end)
    }
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
        .ok()
}

impl SessionWindow {
    /// Build a window from `HH:MM` (or `HH:MM:SS`) strings. Windows may not wrap midnight.
    pub fn new(name: impl Into<String>, start: &str, end: &str) -> Result<Self, DataError> {
        let name = name.into();
        let bad = |what: &str| DataError::InvalidSession(format!("{name}: {what}"));
        let start_t = parse_clock(start).ok_or_else(|| bad(&format!("bad start time '{start}'")))?;
        let end_t = parse_clock(end).ok_or_else(|| bad(&format!("bad end time '{end}'")))?;
        if start_t >= end_t {
            return Err(bad("start must be before end"));
        }
        if name == OTHER_SESSION {
            return Err(bad("name is reserved"));
        }
        Ok(SessionWindow { name, start: start_t, end: end_t })
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

impl fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-{})", self.name, self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Ordered session windows. Lookup is first-match: when windows overlap, the one
/// listed first wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SessionDefinition {
    windows: Vec<SessionWindow>,
}

impl Default for SessionDefinition {
    /// Eastern-time sessions: Asia 19:00-22:00, London 00:00-05:00,
    /// New York Morning 09:30-12:00, New York Afternoon 12:00-16:00.
    fn default() -> Self {
        let w = |name: &str, start: (u32, u32), end: (u32, u32)| SessionWindow {
            name: name.to_string(),
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or(NaiveTime::MIN),
        };
        SessionDefinition {
            windows: vec![
                w("Asia", (19, 0), (22, 0)),
                w("London", (0, 0), (5, 0)),
                w("New York Morning", (9, 30), (12, 0)),
                w("New York Afternoon", (12, 0), (16, 0)),
            ],
        }
    }
}

impl SessionDefinition {
    pub fn new(windows: Vec<SessionWindow>) -> Self {
        SessionDefinition { windows }
    }

    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }

    /// Session name for a local time of day, or [`OTHER_SESSION`].
    pub fn classify(&self, t: NaiveTime) -> &str {
        self.windows
            .iter()
            .find(|w| w.contains(t))
            .map(|w| w.name.as_str())
            .unwrap_or(OTHER_SESSION)
    }

    /// Classify an already-localized timestamp by its wall-clock time.
    pub fn classify_timestamp(&self, ts: &DateTime<Tz>) -> &str {
        self.classify(ts.time())
    }

    /// Window names in configured order followed by [`OTHER_SESSION`].
    pub fn names(&self) -> Vec<String> {
        self.windows
            .iter()
            .map(|w| w.name.clone())
            .chain(std::iter::once(OTHER_SESSION.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn default_windows() {
        let s = SessionDefinition::default();
        assert_eq!(s.classify(t(9, 45)), "New York Morning");
        assert_eq!(s.classify(t(23, 30)), OTHER_SESSION);
        assert_eq!(s.classify(t(0, 0)), "London");
        assert_eq!(s.classify(t(19, 0)), "Asia");
        assert_eq!(s.classify(t(22, 0)), OTHER_SESSION);
    }

    #[test]
    fn boundary_belongs_to_next_window() {
        let s = SessionDefinition::default();
        assert_eq!(s.classify(t(12, 0)), "New York Afternoon");
        assert_eq!(s.classify(t(16, 0)), OTHER_SESSION);
    }

    #[test]
    fn first_listed_window_wins_on_overlap() {
        let s = SessionDefinition::new(vec![
            SessionWindow::new("Wide", "08:00", "12:00").unwrap(),
            SessionWindow::new("Narrow", "09:00", "10:00").unwrap(),
        ]);
        assert_eq!(s.classify(t(9, 30)), "Wide");
    }

    #[test]
    fn classify_timestamp_uses_local_wall_time() {
        let s = SessionDefinition::default();
        let ts = New_York.with_ymd_and_hms(2024, 1, 15, 9, 45, 0).unwrap();
        assert_eq!(s.classify_timestamp(&ts), "New York Morning");
    }

    #[test]
    fn invalid_windows_are_rejected() {
        assert!(SessionWindow::new("Back", "12:00", "09:00").is_err());
        assert!(SessionWindow::new("Bad", "25:00", "26:00").is_err());
        assert!(SessionWindow::new(OTHER_SESSION, "01:00", "02:00").is_err());
    }

    #[test]
    fn names_end_with_other() {
        let names = SessionDefinition::default().names();
        assert_eq!(names.len(), 5);
        assert_eq!(names.last().map(String::as_str), Some(OTHER_SESSION));
    }
}
