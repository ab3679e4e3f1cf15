//! Persistence interfaces consumed by the scheduler and the exam sampler.
//!
//! Both are implemented for `rusqlite::Connection` (and therefore for a
//! `Transaction` through deref), so callers decide the transaction boundary.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

use crate::domain::{ExamDraft, Question, ReviewRecord};
use crate::error::Result;

pub trait ReviewStore {
  /// Fetch the record for (user, question), inserting `defaults` if none exists.
  ///
  /// Returns the stored record and whether it was created. Implementations
  /// signal a lost create race with `Error::UniqueViolation`.
  fn find_or_create_review_record(
    &self,
    user_id: i64,
    question_id: i64,
    defaults: &ReviewRecord,
  ) -> Result<(ReviewRecord, bool)>;

  /// Persist the mutable fields of an existing record.
  fn save_review_record(&self, record: &ReviewRecord) -> Result<()>;

  /// Non-mastered records due on or before `as_of`, by due date then id.
  fn query_due_records(&self, user_id: i64, as_of: NaiveDate) -> Result<Vec<ReviewRecord>>;
}

pub trait ExamStore {
  fn fetch_question_pool(&self, subject: &str) -> Result<Vec<Question>>;

  /// Ids of every question served in one of the user's completed mock exams.
  fn fetch_previously_seen_question_ids(&self, user_id: i64) -> Result<HashSet<i64>>;

  /// Insert the exam and all of its question slots; returns the exam id.
  fn persist_sampled_exam(
    &self,
    user_id: i64,
    draft: &ExamDraft,
    started_at: DateTime<Utc>,
  ) -> Result<i64>;
}
