mod data_engine;
pub mod calendar;
pub mod candle_type;
pub mod error;
pub mod period_summary;
pub mod session_type;
pub mod weekly_table_aggregator;

pub use crate::data_engine::{
    parse_timestamp, write_csv, Bar, CsvRecord, DataEngine, Localization, SourceConfig,
    TimestampFormat, DEFAULT_TIMESTAMP_FORMATS,
};
pub use crate::calendar::{bucket_periods, Period, PeriodKind, TRADING_WEEKDAYS};
pub use crate::candle_type::{classify_bars, flag_series, BarRelation, ClassifiedDay};
pub use crate::error::{DataError, Result};
pub use crate::period_summary::{summarize_bars, summarize_period, Direction, Extreme, PeriodSummary};
pub use crate::session_type::{SessionDefinition, SessionWindow, OTHER_SESSION};
pub use crate::weekly_table_aggregator::{
    aggregate_weekly_table, read_weekly_table, read_weekly_table_from, WeeklySummaryRow,
};
