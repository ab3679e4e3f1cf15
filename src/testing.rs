//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so test code never
//! duplicates table definitions.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

use crate::db;
use crate::domain::Question;

/// Test environment with a file-backed database using the real schema.
///
/// The database lives in a temporary directory that is removed on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with all migrations applied
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("exam_review.db"))?;
        db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Insert a question and return its id. Panics on failure (tests only).
    pub fn add_question(&self, subject: &str, answers: &[u8]) -> i64 {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM questions WHERE subject = ?1",
                [subject],
                |row| row.get(0),
            )
            .unwrap_or(0);
        let question = Question::new(
            subject.to_string(),
            count + 1,
            format!("{} question {}", subject, count + 1),
            answers.iter().copied().collect(),
        );
        match db::insert_question(&self.conn, &question) {
            Ok(id) => id,
            Err(e) => panic!("failed to insert test question: {}", e),
        }
    }

    /// Insert `n` single-answer questions for a subject.
    pub fn add_questions(&self, subject: &str, n: usize) -> Vec<i64> {
        (0..n).map(|_| self.add_question(subject, &[1])).collect()
    }
}
