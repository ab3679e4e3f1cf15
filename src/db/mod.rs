pub mod mock_exams;
pub mod questions;
pub mod repository;
pub mod reviews;
pub mod schema;
pub mod stats;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

// Re-export all public items from submodules
pub use mock_exams::*;
pub use questions::*;
pub use repository::{ExamStore, ReviewStore};
pub use reviews::*;
pub use schema::run_migrations;
pub use stats::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Storage format of calendar dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }
}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> Result<MutexGuard<'_, Connection>> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        Error::DbLock
    })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .log_warn("Could not create database directory");
    }

    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_db_creates_parent_and_schema() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("exam.db");

        let pool = init_db(&path).unwrap();
        assert!(path.exists());

        let conn = try_lock(&pool).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM review_schedules", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_date_round_trip() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(format_date(d), "2024-01-09");
        assert_eq!(parse_date(0, "2024-01-09").unwrap(), d);
        assert!(parse_date(0, "09/01/2024").is_err());
    }

    #[test]
    fn test_parse_timestamp_normalizes_to_utc() {
        let ts = parse_timestamp(0, "2024-01-10T09:00:00+09:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-10T00:00:00+00:00");
        assert!(parse_timestamp(0, "yesterday").is_err());
    }

    #[test]
    fn test_log_warn() {
        let failed: std::result::Result<i32, String> = Err("boom".into());
        assert_eq!(failed.log_warn("test"), None);
        let ok: std::result::Result<i32, String> = Ok(3);
        assert_eq!(ok.log_warn("test"), Some(3));
    }
}
