use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Spaced-repetition state for one (user, question) pair.
///
/// Created on the first wrong answer in a graded attempt, reset in place on
/// every later wrong answer, and advanced in place on a correct review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
  pub id: i64,
  pub user_id: i64,
  pub question_id: i64,
  pub last_failure_at: DateTime<Utc>,
  /// Consecutive correct reviews since the last reset
  pub review_count: u32,
  /// Local calendar date on which the question becomes due
  pub next_due_date: NaiveDate,
  pub is_mastered: bool,
}

/// Position of a record in the review state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
  Active { review_count: u32 },
  Mastered,
}

impl ReviewRecord {
  pub fn state(&self) -> ReviewState {
    if self.is_mastered {
      ReviewState::Mastered
    } else {
      ReviewState::Active {
        review_count: self.review_count,
      }
    }
  }

  /// True if the record should be offered in a review session on `as_of`
  pub fn is_due(&self, as_of: NaiveDate) -> bool {
    !self.is_mastered && self.next_due_date <= as_of
  }
}

impl ReviewState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active { .. } => "active",
      Self::Mastered => "mastered",
    }
  }
}
