//! Turns parsed search filters into one bounded read against the record
//! store, with fetch-one-extra has-more detection.
//!
//! Raw `date:` / `time:` values arrive unvalidated from the parser. The
//! planner resolves them here and ignores values it cannot parse, logging
//! at warn level. The same lenient policy applies on every path.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use tracing::warn;

use lookback_core::SearchFilters;
use lookback_db::{CaptureRecord, ClockTime, DatabaseManager, RecordQuery};

/// Tolerance applied when `time:` names a single clock time instead of a
/// range: within one minute either side.
const SINGLE_TIME_TOLERANCE_SECS: u32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub entries: Vec<CaptureRecord>,
    pub has_more: bool,
    /// The resolved `date:` filter when present and valid, otherwise today
    /// (local), formatted `YYYY-MM-DD`.
    pub current_date: String,
}

/// Run one paginated retrieval. Fetches `limit + 1` rows so `has_more` needs
/// no second counting query; the extra row is truncated away.
pub async fn search_records(
    db: &DatabaseManager,
    filters: &SearchFilters,
) -> Result<SearchPage, sqlx::Error> {
    let today = Local::now().date_naive();
    let (query, resolved_day) = build_record_query(filters, today);

    let page = filters.page.max(1);
    let limit = filters.limit.max(1);
    let offset = (page - 1).saturating_mul(limit);

    let mut entries = db
        .find_records(&query, limit.saturating_add(1), offset)
        .await?;
    let has_more = entries.len() as u32 > limit;
    if has_more {
        entries.truncate(limit as usize);
    }

    let current_date = resolved_day.unwrap_or(today).format("%Y-%m-%d").to_string();

    Ok(SearchPage {
        entries,
        has_more,
        current_date,
    })
}

/// Translate filters into the store's query vocabulary. Returns the resolved
/// calendar day alongside so the response can echo it.
pub(crate) fn build_record_query(
    filters: &SearchFilters,
    today: NaiveDate,
) -> (RecordQuery, Option<NaiveDate>) {
    let mut query = RecordQuery::default();

    if !filters.query.is_empty() {
        query.text = Some(filters.query.clone());
    }
    query.title = filters.title.clone();
    query.url = filters.url.clone();

    let mut resolved_day = None;
    if let Some(raw) = &filters.date {
        match resolve_date(raw, today) {
            Some(day) => {
                if let Some((start, end)) = day_bounds(day) {
                    query.start_time = Some(start);
                    query.end_time = Some(end);
                    resolved_day = Some(day);
                }
            }
            None => warn!("ignoring unparseable date filter: {:?}", raw),
        }
    }

    if let Some(raw) = &filters.time {
        match resolve_time(raw) {
            Some(clock) => query.clock_time = Some(clock),
            None => warn!("ignoring unparseable time filter: {:?}", raw),
        }
    }

    (query, resolved_day)
}

/// Resolve a raw `date:` value against the local calendar.
pub(crate) fn resolve_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "today" => return Some(today),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"] {
        if let Ok(day) = NaiveDate::parse_from_str(value, fmt) {
            return Some(day);
        }
    }

    // month/day shorthand resolves against the current year
    if let Some((month, day)) = value.split_once(['/', '-']) {
        if let (Ok(month), Ok(day)) = (month.parse(), day.parse()) {
            return NaiveDate::from_ymd_opt(today.year(), month, day);
        }
    }

    None
}

/// Resolve a raw `time:` value: a single clock time (± one minute) or an
/// inclusive `start-end` range.
pub(crate) fn resolve_time(raw: &str) -> Option<ClockTime> {
    let value = raw.trim();
    if let Some((start, end)) = value.split_once('-') {
        let start = parse_clock(start.trim())?;
        let end = parse_clock(end.trim())?;
        return Some(ClockTime::Range {
            start_secs: start.num_seconds_from_midnight(),
            end_secs: end.num_seconds_from_midnight(),
        });
    }
    parse_clock(value).map(|t| ClockTime::Near {
        secs: t.num_seconds_from_midnight(),
        tolerance_secs: SINGLE_TIME_TOLERANCE_SECS,
    })
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.to_ascii_uppercase();
    for fmt in ["%H:%M:%S", "%H:%M", "%I:%M%p", "%I%p"] {
        if let Ok(t) = NaiveTime::parse_from_str(&value, fmt) {
            return Some(t);
        }
    }
    None
}

/// The day's `[00:00:00.000, 23:59:59.999]` window in local time, as UTC
/// bounds for the store.
fn day_bounds(day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Local
        .from_local_datetime(&day.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    let end = Local
        .from_local_datetime(&day.and_hms_milli_opt(23, 59, 59, 999)?)
        .latest()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
