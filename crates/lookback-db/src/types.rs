use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One captured moment. Records are created by the external capture
/// subsystem; this layer only reads them.
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub title: Option<String>,
    pub app_name: Option<String>,
    pub window_name: Option<String>,
    pub browser_url: Option<String>,
    pub text: Option<String>,
    pub image_path: String,
}

/// Clock-time constraint evaluated on the local time-of-day component only;
/// the date part of the timestamp is ignored. Seconds count from local
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTime {
    /// Inclusive range, same-day semantics.
    Range { start_secs: u32, end_secs: u32 },
    /// Within `tolerance_secs` of `secs` on the clock face, wrapping across
    /// midnight.
    Near { secs: u32, tolerance_secs: u32 },
}

/// The filter set for one `find_records` call. All present filters are
/// conjunctive. Substring needles are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Substring over the concatenation of title, app_name, window_name,
    /// browser_url and text.
    pub text: Option<String>,
    /// Substring over title only.
    pub title: Option<String>,
    /// Substring over browser_url only.
    pub url: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub clock_time: Option<ClockTime>,
}
