//! Crate-wide error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No subject in the requested order had any candidate question.
  #[error("not enough questions to build a mock exam")]
  EmptyPool,

  /// Insert collided with the (user_id, question_id) uniqueness constraint.
  #[error("review record already exists for this user and question")]
  UniqueViolation,

  #[error("{0} {1} not found")]
  NotFound(&'static str, i64),

  #[error("mock exam {0} has already been submitted")]
  ExamAlreadyCompleted(i64),

  #[error("choice {choice} is out of range for question {question_id}")]
  InvalidChoice { question_id: i64, choice: u8 },

  #[error("invalid configuration: {0}")]
  Config(String),

  /// A question in an import file cannot be stored as given.
  #[error("invalid question {subject} #{number}: {reason}")]
  InvalidQuestion {
    subject: String,
    number: i64,
    reason: String,
  },

  #[error("database unavailable")]
  DbLock,

  #[error(transparent)]
  Database(#[from] rusqlite::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Map a rusqlite error, turning UNIQUE constraint failures into `UniqueViolation`.
  pub fn from_insert(err: rusqlite::Error) -> Self {
    match &err {
      rusqlite::Error::SqliteFailure(e, _)
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
      {
        Self::UniqueViolation
      }
      _ => Self::Database(err),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
