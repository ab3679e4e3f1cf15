//! Question bank import from JSON files.
//!
//! File format: a JSON array of
//! `{"subject": "...", "number": 1, "content": "...", "answers": [2]}`.
//! Legacy files with a single `"answer": 2` are accepted too.

use rusqlite::Connection;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::db;
use crate::domain::Question;
use crate::error::{Error, Result};

/// Question definition as stored in an import file
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDefinition {
    pub subject: String,
    pub number: i64,
    pub content: String,
    #[serde(default)]
    pub answers: Vec<u8>,
    /// Single-answer form used by older exports
    #[serde(default)]
    pub answer: Option<u8>,
}

impl QuestionDefinition {
    fn invalid(&self, reason: String) -> Error {
        Error::InvalidQuestion {
            subject: self.subject.clone(),
            number: self.number,
            reason,
        }
    }

    fn into_question(self) -> Result<Question> {
        let mut choices: BTreeSet<u8> = self.answers.iter().copied().collect();
        choices.extend(self.answer);

        if choices.is_empty() {
            return Err(self.invalid("no correct answer".into()));
        }
        if let Some(&bad) = choices.iter().find(|&&c| !Question::is_valid_choice(c)) {
            return Err(self.invalid(format!("answer {} is not a choice", bad)));
        }

        Ok(Question::new(self.subject, self.number, self.content, choices))
    }
}

pub fn parse_questions(json: &str) -> Result<Vec<Question>> {
    let defs: Vec<QuestionDefinition> = serde_json::from_str(json)?;
    defs.into_iter().map(QuestionDefinition::into_question).collect()
}

/// Insert every question in `json` atomically. Returns the number imported.
pub fn import_questions(conn: &mut Connection, json: &str) -> Result<usize> {
    let questions = parse_questions(json)?;

    let tx = conn.transaction()?;
    for question in &questions {
        db::insert_question(&tx, question)?;
    }
    tx.commit()?;

    tracing::info!("Imported {} questions", questions.len());
    Ok(questions.len())
}

pub fn import_questions_file(conn: &mut Connection, path: &Path) -> Result<usize> {
    let json = std::fs::read_to_string(path)?;
    import_questions(conn, &json)
}
