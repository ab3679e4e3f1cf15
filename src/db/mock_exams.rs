//! Mock exam sessions and their question slots

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

use super::questions::get_questions_by_subject;
use super::repository::ExamStore;
use super::{parse_timestamp, LogOnError};
use crate::domain::{ExamDraft, MockExam, MockExamQuestion, Question};
use crate::error::Result;

fn row_to_mock_exam(row: &Row) -> rusqlite::Result<MockExam> {
    let started_at: String = row.get(2)?;
    let finished_at: Option<String> = row.get(3)?;
    Ok(MockExam {
        id: row.get(0)?,
        user_id: row.get(1)?,
        started_at: parse_timestamp(2, &started_at)?,
        finished_at: finished_at.map(|s| parse_timestamp(3, &s)).transpose()?,
        score: row.get(4)?,
        is_completed: row.get(5)?,
    })
}

fn row_to_exam_question(row: &Row) -> rusqlite::Result<MockExamQuestion> {
    Ok(MockExamQuestion {
        id: row.get(0)?,
        mock_exam_id: row.get(1)?,
        question_id: row.get(2)?,
        subject: row.get(3)?,
        position: row.get(4)?,
        selected_choice: row.get(5)?,
        is_correct: row.get(6)?,
    })
}

/// Get an exam owned by `user_id`
pub fn get_mock_exam(conn: &Connection, exam_id: i64, user_id: i64) -> Result<Option<MockExam>> {
    let exam = conn
        .query_row(
            r#"
      SELECT id, user_id, started_at, finished_at, score, is_completed
      FROM mock_exams WHERE id = ?1 AND user_id = ?2
      "#,
            params![exam_id, user_id],
            row_to_mock_exam,
        )
        .optional()?;
    Ok(exam)
}

/// Most recent exams first
pub fn recent_mock_exams(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<MockExam>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, started_at, finished_at, score, is_completed
    FROM mock_exams
    WHERE user_id = ?1
    ORDER BY started_at DESC, id DESC
    LIMIT ?2
    "#,
    )?;
    let exams = stmt
        .query_map(params![user_id, limit as i64], row_to_mock_exam)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(exams)
}

/// Question slots of an exam in exam order
pub fn get_mock_exam_questions(conn: &Connection, exam_id: i64) -> Result<Vec<MockExamQuestion>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, mock_exam_id, question_id, subject, position, selected_choice, is_correct
    FROM mock_exam_questions
    WHERE mock_exam_id = ?1
    ORDER BY position ASC
    "#,
    )?;
    let questions = stmt
        .query_map(params![exam_id], row_to_exam_question)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(questions)
}

/// Store the learner's choice for one slot
pub fn record_answer(conn: &Connection, slot_id: i64, choice: u8, is_correct: bool) -> Result<()> {
    conn.execute(
        "UPDATE mock_exam_questions SET selected_choice = ?1, is_correct = ?2 WHERE id = ?3",
        params![choice, is_correct, slot_id],
    )?;
    Ok(())
}

pub fn complete_mock_exam(
    conn: &Connection,
    exam_id: i64,
    score: u32,
    finished_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE mock_exams SET score = ?1, finished_at = ?2, is_completed = 1 WHERE id = ?3",
        params![score, finished_at.to_rfc3339(), exam_id],
    )?;
    Ok(())
}

fn insert_exam_rows(
    conn: &Connection,
    user_id: i64,
    draft: &ExamDraft,
    started_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO mock_exams (user_id, started_at) VALUES (?1, ?2)",
        params![user_id, started_at.to_rfc3339()],
    )?;
    let exam_id = conn.last_insert_rowid();

    let mut stmt = conn.prepare(
        r#"
    INSERT INTO mock_exam_questions (mock_exam_id, question_id, subject, position)
    VALUES (?1, ?2, ?3, ?4)
    "#,
    )?;
    for (position, (subject, question_id)) in draft.entries().enumerate() {
        stmt.execute(params![exam_id, question_id, subject, position as i64])?;
    }

    Ok(exam_id)
}

impl ExamStore for Connection {
    fn fetch_question_pool(&self, subject: &str) -> Result<Vec<Question>> {
        get_questions_by_subject(self, subject)
    }

    fn fetch_previously_seen_question_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        let mut stmt = self.prepare(
            r#"
      SELECT DISTINCT q.question_id
      FROM mock_exam_questions q
      JOIN mock_exams e ON q.mock_exam_id = e.id
      WHERE e.user_id = ?1 AND e.is_completed = 1
      "#,
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<i64>>>()?;
        Ok(ids)
    }

    fn persist_sampled_exam(
        &self,
        user_id: i64,
        draft: &ExamDraft,
        started_at: DateTime<Utc>,
    ) -> Result<i64> {
        // Savepoint so a failed batch leaves no half-populated exam,
        // whether or not the caller opened a transaction
        self.execute_batch("SAVEPOINT persist_exam")?;
        match insert_exam_rows(self, user_id, draft, started_at) {
            Ok(exam_id) => {
                self.execute_batch("RELEASE persist_exam")?;
                Ok(exam_id)
            }
            Err(e) => {
                self.execute_batch("ROLLBACK TO persist_exam; RELEASE persist_exam")
                    .log_warn("Failed to roll back partial mock exam");
                Err(e)
            }
        }
    }
}
