use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{DataError, Result};

/// A row type that knows its own CSV header and cell rendering.
pub trait CsvRecord: std::fmt::Debug {
    fn headers() -> &'static [&'static str];
    fn record(&self) -> Vec<String>;
}

/// One OHLCV bar with its timestamp resolved into the reference timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Calendar date in the reference timezone.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// `low <= open, close <= high`
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }
}

/// One strategy for reading the date column. Strategies are tried in order and the
/// first that succeeds wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `YYYYMMDD HHMMSS`
    CompactDateTime,
    /// `YYYYMMDD`
    CompactDate,
    /// ISO, dotted and slashed layouts, RFC-3339 with offset.
    Generic,
}

pub const DEFAULT_TIMESTAMP_FORMATS: [TimestampFormat; 3] = [
    TimestampFormat::CompactDateTime,
    TimestampFormat::CompactDate,
    TimestampFormat::Generic,
];

impl TimestampFormat {
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        match self {
            TimestampFormat::CompactDateTime => {
                NaiveDateTime::parse_from_str(s, "%Y%m%d %H%M%S").ok()
            }
            TimestampFormat::CompactDate => NaiveDate::parse_from_str(s, "%Y%m%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
            TimestampFormat::Generic => parse_generic(s),
        }
    }
}

/// Run `raw` through `formats` and return the first successful parse.
pub fn parse_timestamp(raw: &str, formats: &[TimestampFormat]) -> Option<NaiveDateTime> {
    formats.iter().find_map(|f| f.parse(raw))
}

fn parse_generic(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let datetime_fmts = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y.%m.%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y%m%d%H%M%S",
        "%Y%m%d %H:%M:%S",
    ];
    for f in &datetime_fmts {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(dt);
        }
    }

    let date_fmts = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
    for f in &date_fmts {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// How parsed wall-clock values map onto the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Localization {
    /// Every timestamp is UTC and gets converted. Date-only rows become the evening
    /// of the previous calendar day in zones west of UTC.
    #[default]
    UtcToReference,
    /// Date-only rows keep their calendar date in the reference timezone. A file with
    /// any non-midnight time is still read as UTC.
    ReferenceWall,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub delimiter: u8,
    pub reference_tz: Tz,
    pub localization: Localization,
    pub formats: Vec<TimestampFormat>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            path: PathBuf::from("sp500.csv"),
            delimiter: b';',
            reference_tz: chrono_tz::America::New_York,
            localization: Localization::default(),
            formats: DEFAULT_TIMESTAMP_FORMATS.to_vec(),
        }
    }
}

impl SourceConfig {
    pub fn with_localization(mut self, localization: Localization) -> Self {
        self.localization = localization;
        self
    }
}

#[derive(Debug)]
struct RawBar {
    line: u64,
    naive: NaiveDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Reads headerless `Date[Time], Open, High, Low, Close, Volume` files into bars.
pub struct DataEngine {
    config: SourceConfig,
}

impl DataEngine {
    pub fn new(config: SourceConfig) -> Self {
        DataEngine { config }
    }

    /// Load the configured file, sorted ascending by timestamp.
    pub fn fetch_from_csv(&self) -> Result<Vec<Bar>> {
        let path = self.config.path.as_path();
        if !path.exists() {
            return Err(DataError::SourceNotFound { path: path.to_path_buf() });
        }
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataError::SourceNotFound { path: path.to_path_buf() },
            _ => DataError::Io(e),
        })?;
        let bars = self.fetch_from_reader(file)?;
        info!(path = %path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }

    /// Same as [`DataEngine::fetch_from_csv`] over any reader. The reader is consumed and
    /// dropped before localization starts.
    pub fn fetch_from_reader<R: Read>(&self, reader: R) -> Result<Vec<Bar>> {
        let (raws, skipped) = self.read_raw(reader)?;
        if raws.is_empty() {
            return Err(DataError::empty(format!(
                "no valid bars in input ({skipped} rows skipped)"
            )));
        }

        let mut bars = self.localize(raws);
        if bars.is_empty() {
            return Err(DataError::empty("no bars survived timezone localization"));
        }
        bars.sort_by_key(|b| b.timestamp);

        let malformed = bars.iter().filter(|b| !b.is_well_formed()).count();
        if malformed > 0 {
            warn!(malformed, "bars with low above open/close/high kept as-is");
        }
        Ok(bars)
    }

    fn read_raw<R: Read>(&self, reader: R) -> Result<(Vec<RawBar>, usize)> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.config.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut raws = Vec::new();
        let mut skipped = 0usize;
        for (idx, result) in rdr.records().enumerate() {
            let line = idx as u64 + 1;
            let parsed = match result {
                Ok(record) => self.parse_row(&record, line),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(e) => Err(DataError::UnparseableRow { line, reason: e.to_string() }),
            };
            match parsed {
                Ok(raw) => raws.push(raw),
                Err(e) => {
                    warn!("skipping {e}");
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            info!(skipped, kept = raws.len(), "rows dropped while reading");
        }
        Ok((raws, skipped))
    }

    fn parse_row(&self, record: &StringRecord, line: u64) -> Result<RawBar> {
        if record.len() < 6 {
            return Err(DataError::UnparseableRow {
                line,
                reason: format!("expected 6 fields, found {}", record.len()),
            });
        }
        let naive = parse_timestamp(&record[0], &self.config.formats).ok_or_else(|| {
            DataError::UnparseableRow {
                line,
                reason: format!("unrecognised timestamp '{}'", &record[0]),
            }
        })?;

        let price = |i: usize| -> Result<f64> {
            record[i].parse::<f64>().map_err(|_| DataError::UnparseableRow {
                line,
                reason: format!("bad number '{}' in column {}", &record[i], i + 1),
            })
        };

        Ok(RawBar {
            line,
            naive,
            open: price(1)?,
            high: price(2)?,
            low: price(3)?,
            close: price(4)?,
            volume: parse_volume(&record[5]).ok_or_else(|| DataError::UnparseableRow {
                line,
                reason: format!("bad volume '{}'", &record[5]),
            })?,
        })
    }

    fn localize(&self, raws: Vec<RawBar>) -> Vec<Bar> {
        let tz = self.config.reference_tz;
        let intraday = raws.iter().any(|r| r.naive.time() != NaiveTime::MIN);
        let mode = if intraday {
            Localization::UtcToReference
        } else {
            self.config.localization
        };
        debug!(intraday, ?mode, tz = %tz, "localizing timestamps");

        if mode == Localization::UtcToReference && !intraday {
            warn!(
                tz = %tz,
                "date-only bars are read as UTC midnight; calendar dates may shift back one day"
            );
        }

        raws.into_iter()
            .filter_map(|r| {
                let timestamp = match mode {
                    Localization::UtcToReference => {
                        Utc.from_utc_datetime(&r.naive).with_timezone(&tz)
                    }
                    Localization::ReferenceWall => match tz.from_local_datetime(&r.naive).earliest() {
                        Some(ts) => ts,
                        None => {
                            warn!(line = r.line, naive = %r.naive, "local time does not exist in {tz}, row skipped");
                            return None;
                        }
                    },
                };
                Some(Bar {
                    timestamp,
                    open: r.open,
                    high: r.high,
                    low: r.low,
                    close: r.close,
                    volume: r.volume,
                })
            })
            .collect()
    }
}

fn parse_volume(s: &str) -> Option<u64> {
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v.round() as u64),
        _ => None,
    }
}

/// Write `records` with a header row to `file_path`.
pub fn write_csv<T: CsvRecord, P: AsRef<Path>>(records: &[T], file_path: P) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(file_path.as_ref())?;

    writer.write_record(T::headers())?;
    for record in records {
        writer.write_record(record.record())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Weekday};
    use std::io::Write;

    fn engine(localization: Localization) -> DataEngine {
        DataEngine::new(SourceConfig::default().with_localization(localization))
    }

    #[test]
    fn formats_are_tried_in_order() {
        let dt = parse_timestamp("20240115 143000", &DEFAULT_TIMESTAMP_FORMATS).unwrap();
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);

        let d = parse_timestamp("20240115", &DEFAULT_TIMESTAMP_FORMATS).unwrap();
        assert_eq!(d.time(), NaiveTime::MIN);
        assert_eq!(d.day(), 15);

        let g = parse_timestamp("2024-01-15 09:30:00", &DEFAULT_TIMESTAMP_FORMATS).unwrap();
        assert_eq!(g.hour(), 9);

        assert!(parse_timestamp("not a date", &DEFAULT_TIMESTAMP_FORMATS).is_none());
    }

    #[test]
    fn date_only_format_rejects_trailing_time() {
        assert!(TimestampFormat::CompactDate.parse("20240115 143000").is_none());
        assert!(TimestampFormat::CompactDateTime.parse("20240115").is_none());
    }

    #[test]
    fn bad_rows_are_skipped_and_output_is_sorted() {
        let data = "20240117;101;103;100;102;10\n\
                    garbage;1;2;3;4;5\n\
                    20240115;100;105;99;101;20\n\
                    20240116;101;abc;99;101;20\n";
        let bars = engine(Localization::ReferenceWall)
            .fetch_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[1].date(), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(bars[0].volume, 20);
    }

    #[test]
    fn all_rows_bad_is_empty_dataset() {
        let err = engine(Localization::ReferenceWall)
            .fetch_from_reader("x;1;2;3;4;5\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn intraday_utc_is_converted_to_eastern() {
        let bars = engine(Localization::UtcToReference)
            .fetch_from_reader("20240115 143000;1;2;0.5;1.5;7\n".as_bytes())
            .unwrap();
        let ts = bars[0].timestamp;
        assert_eq!((ts.hour(), ts.minute()), (9, 30));
        assert_eq!(ts.weekday(), Weekday::Mon);
    }

    #[test]
    fn date_only_utc_shifts_to_previous_evening() {
        let bars = engine(Localization::UtcToReference)
            .fetch_from_reader("20240115;1;2;0.5;1.5;7\n".as_bytes())
            .unwrap();
        assert_eq!(bars[0].date(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(bars[0].timestamp.hour(), 19);
    }

    #[test]
    fn wall_localization_keeps_calendar_date() {
        let bars = engine(Localization::ReferenceWall)
            .fetch_from_reader("20240115;1;2;0.5;1.5;7.0\n".as_bytes())
            .unwrap();
        assert_eq!(bars[0].date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].time(), NaiveTime::MIN);
        assert_eq!(bars[0].volume, 7);
    }

    #[test]
    fn intraday_rows_are_utc_even_in_wall_mode() {
        // 03:00 UTC Monday is 22:00 Sunday in New York.
        let data = "20240115 030000;100;101;90;100;1\n20240116 150000;100;105;99;104;1\n";
        let bars = engine(Localization::ReferenceWall)
            .fetch_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(bars[0].date(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(bars[0].timestamp.weekday(), Weekday::Sun);
        assert_eq!((bars[0].timestamp.hour(), bars[0].timestamp.minute()), (22, 0));
        assert_eq!(bars[1].timestamp.hour(), 10);
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let cfg = SourceConfig {
            path: PathBuf::from("/definitely/not/here.csv"),
            ..SourceConfig::default()
        };
        let err = DataEngine::new(cfg).fetch_from_csv().unwrap_err();
        assert!(matches!(err, DataError::SourceNotFound { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn reads_file_with_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "20240115,100,105,99,101,20").unwrap();
        writeln!(f, "20240116,101,106,100,104,20").unwrap();
        drop(f);

        let cfg = SourceConfig {
            path,
            delimiter: b',',
            localization: Localization::ReferenceWall,
            ..SourceConfig::default()
        };
        let bars = DataEngine::new(cfg).fetch_from_csv().unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 104.0);
    }
}
