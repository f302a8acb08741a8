use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::{CaptureRecord, ClockTime, RecordQuery};

/// Seconds since local midnight for a stored timestamp. Clock-time filters
/// compare on this value only, ignoring the date component.
const SECONDS_OF_LOCAL_DAY: &str = "(CAST(strftime('%H', timestamp, 'localtime') AS INTEGER) * 3600 \
     + CAST(strftime('%M', timestamp, 'localtime') AS INTEGER) * 60 \
     + CAST(strftime('%S', timestamp, 'localtime') AS INTEGER))";

/// Read-only access to the capture record store. The capture subsystem owns
/// all writes; nothing in this crate inserts, updates or deletes records.
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        debug!("initializing database manager at {}", database_path);
        let connection_string = format!("sqlite:{}", database_path);

        if !sqlx::Sqlite::database_exists(&connection_string).await? {
            sqlx::Sqlite::create_database(&connection_string).await?;
        }

        let connect_options: SqliteConnectOptions = connection_string
            .parse::<SqliteConnectOptions>()?
            // all pooled connections wait before returning SQLITE_BUSY
            .busy_timeout(Duration::from_secs(30))
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(DatabaseManager { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./src/migrations")
            .run(pool)
            .await
            .map_err(|e| e.into())
    }

    /// The single bounded read primitive: conjunctive filters, newest first,
    /// `LIMIT`/`OFFSET` pagination. Callers implement has-more detection by
    /// fetching one row past their page size.
    pub async fn find_records(
        &self,
        query: &RecordQuery,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CaptureRecord>, sqlx::Error> {
        let clock_condition = match query.clock_time {
            None => String::new(),
            Some(ClockTime::Range {
                start_secs,
                end_secs,
            }) => format!(
                "AND {SECONDS_OF_LOCAL_DAY} BETWEEN {start_secs} AND {end_secs}"
            ),
            // modular distance, so the tolerance window wraps across midnight
            Some(ClockTime::Near {
                secs,
                tolerance_secs,
            }) => format!(
                "AND MIN(ABS({SECONDS_OF_LOCAL_DAY} - {secs}), \
                 86400 - ABS({SECONDS_OF_LOCAL_DAY} - {secs})) <= {tolerance_secs}"
            ),
        };

        let sql = format!(
            r#"
        SELECT id, timestamp, title, app_name, window_name, browser_url, text, image_path
        FROM captures
        WHERE 1=1
            AND (?1 IS NULL OR LOWER(
                    COALESCE(title, '') || ' ' || COALESCE(app_name, '') || ' '
                    || COALESCE(window_name, '') || ' ' || COALESCE(browser_url, '') || ' '
                    || COALESCE(text, '')
                ) LIKE '%' || ?1 || '%' ESCAPE '\')
            AND (?2 IS NULL OR LOWER(COALESCE(title, '')) LIKE '%' || ?2 || '%' ESCAPE '\')
            AND (?3 IS NULL OR LOWER(COALESCE(browser_url, '')) LIKE '%' || ?3 || '%' ESCAPE '\')
            AND (?4 IS NULL OR timestamp >= ?4)
            AND (?5 IS NULL OR timestamp <= ?5)
            {clock_condition}
        ORDER BY timestamp DESC
        LIMIT ?6 OFFSET ?7
        "#
        );

        sqlx::query_as(&sql)
            .bind(query.text.as_deref().map(like_needle))
            .bind(query.title.as_deref().map(like_needle))
            .bind(query.url.as_deref().map(like_needle))
            .bind(query.start_time)
            .bind(query.end_time)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Look up a single record. Absence is `None`, not an error.
    pub async fn find_record(&self, id: i64) -> Result<Option<CaptureRecord>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, timestamp, title, app_name, window_name, browser_url, text, image_path \
             FROM captures WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// All record timestamps, newest first. Backs the timeline strip.
    pub async fn list_timestamps(&self) -> Result<Vec<DateTime<Utc>>, sqlx::Error> {
        sqlx::query_scalar("SELECT timestamp FROM captures ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await
    }
}

/// Lowercase a substring needle and escape LIKE metacharacters so user input
/// matches literally.
fn like_needle(value: &str) -> String {
    let mut needle = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            needle.push('\\');
        }
        needle.push(c);
    }
    needle
}
