//! Question bank queries

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

use crate::domain::Question;
use crate::error::Result;

const QUESTION_COLUMNS: &str = "id, subject, number, content, answers";

fn row_to_question(row: &Row) -> rusqlite::Result<Question> {
    let answers: String = row.get(4)?;
    let correct_choices: BTreeSet<u8> = serde_json::from_str(&answers).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Question {
        id: row.get(0)?,
        subject: row.get(1)?,
        number: row.get(2)?,
        content: row.get(3)?,
        correct_choices,
    })
}

pub fn insert_question(conn: &Connection, question: &Question) -> Result<i64> {
    let answers = serde_json::to_string(&question.correct_choices)?;
    conn.execute(
        "INSERT INTO questions (subject, number, content, answers) VALUES (?1, ?2, ?3, ?4)",
        params![question.subject, question.number, question.content, answers],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_question_by_id(conn: &Connection, id: i64) -> Result<Option<Question>> {
    let question = conn
        .query_row(
            &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
            params![id],
            row_to_question,
        )
        .optional()?;
    Ok(question)
}

/// All questions of a subject, in insertion order
pub fn get_questions_by_subject(conn: &Connection, subject: &str) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM questions WHERE subject = ?1 ORDER BY id ASC",
        QUESTION_COLUMNS
    ))?;
    let questions = stmt
        .query_map(params![subject], row_to_question)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(questions)
}

/// Distinct subjects with their question counts
pub fn list_subjects(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT subject, COUNT(*) FROM questions GROUP BY subject ORDER BY subject ASC",
    )?;
    let subjects = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(subjects)
}
