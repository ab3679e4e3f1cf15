//! Review schedule persistence

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::repository::ReviewStore;
use super::{format_date, parse_date, parse_timestamp};
use crate::domain::ReviewRecord;
use crate::error::{Error, Result};

const REVIEW_COLUMNS: &str =
    "id, user_id, question_id, last_failure_at, review_count, next_due_date, is_mastered";

fn row_to_review(row: &Row) -> rusqlite::Result<ReviewRecord> {
    let last_failure_at: String = row.get(3)?;
    let next_due_date: String = row.get(5)?;
    Ok(ReviewRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        question_id: row.get(2)?,
        last_failure_at: parse_timestamp(3, &last_failure_at)?,
        review_count: row.get(4)?,
        next_due_date: parse_date(5, &next_due_date)?,
        is_mastered: row.get(6)?,
    })
}

pub fn get_review_record(
    conn: &Connection,
    user_id: i64,
    question_id: i64,
) -> Result<Option<ReviewRecord>> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {} FROM review_schedules WHERE user_id = ?1 AND question_id = ?2",
                REVIEW_COLUMNS
            ),
            params![user_id, question_id],
            row_to_review,
        )
        .optional()?;
    Ok(record)
}

/// Count of records not yet mastered, due or not
pub fn count_active_reviews(conn: &Connection, user_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM review_schedules WHERE user_id = ?1 AND is_mastered = 0",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

impl ReviewStore for Connection {
    fn find_or_create_review_record(
        &self,
        user_id: i64,
        question_id: i64,
        defaults: &ReviewRecord,
    ) -> Result<(ReviewRecord, bool)> {
        if let Some(existing) = get_review_record(self, user_id, question_id)? {
            return Ok((existing, false));
        }

        self.execute(
            r#"
      INSERT INTO review_schedules
        (user_id, question_id, last_failure_at, review_count, next_due_date, is_mastered)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
            params![
                user_id,
                question_id,
                defaults.last_failure_at.to_rfc3339(),
                defaults.review_count,
                format_date(defaults.next_due_date),
                defaults.is_mastered,
            ],
        )
        .map_err(Error::from_insert)?;

        let created = ReviewRecord {
            id: self.last_insert_rowid(),
            user_id,
            question_id,
            ..defaults.clone()
        };
        Ok((created, true))
    }

    fn save_review_record(&self, record: &ReviewRecord) -> Result<()> {
        let updated = self.execute(
            r#"
      UPDATE review_schedules
      SET last_failure_at = ?1, review_count = ?2, next_due_date = ?3, is_mastered = ?4
      WHERE user_id = ?5 AND question_id = ?6
      "#,
            params![
                record.last_failure_at.to_rfc3339(),
                record.review_count,
                format_date(record.next_due_date),
                record.is_mastered,
                record.user_id,
                record.question_id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound("review record", record.id));
        }
        Ok(())
    }

    fn query_due_records(&self, user_id: i64, as_of: NaiveDate) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self.prepare(&format!(
            r#"
      SELECT {}
      FROM review_schedules
      WHERE user_id = ?1 AND is_mastered = 0 AND next_due_date <= ?2
      ORDER BY next_due_date ASC, id ASC
      "#,
            REVIEW_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![user_id, format_date(as_of)], row_to_review)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}
