//! Fixed-interval review scheduling with reset-on-failure.
//!
//! Each wrong answer restarts the ladder; each correct review climbs one
//! rung. The Nth rung is `interval[N]` days after the last failure. Climbing
//! past the last rung masters the question.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

use crate::config;
use crate::db::ReviewStore;
use crate::domain::{Question, ReviewRecord};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ReviewScheduler {
  intervals: Vec<i64>,
  tz: FixedOffset,
}

impl Default for ReviewScheduler {
  fn default() -> Self {
    Self::with_timezone(config::default_offset())
  }
}

impl ReviewScheduler {
  pub fn new(intervals: Vec<i64>, tz: FixedOffset) -> Self {
    Self { intervals, tz }
  }

  /// Scheduler with the standard interval table in the given time zone
  pub fn with_timezone(tz: FixedOffset) -> Self {
    Self::new(config::REVIEW_INTERVALS_DAYS.to_vec(), tz)
  }

  /// Number of correct reviews needed for mastery
  pub fn mastery_count(&self) -> u32 {
    self.intervals.len() as u32
  }

  /// Calendar date of `at` in the scheduler's time zone
  pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&self.tz).date_naive()
  }

  pub fn today(&self) -> NaiveDate {
    self.local_date(Utc::now())
  }

  /// Due date for a record failed on `failed_on` with `review_count` correct reviews.
  /// None once the interval table is exhausted.
  pub fn due_date(&self, failed_on: NaiveDate, review_count: u32) -> Option<NaiveDate> {
    self
      .intervals
      .get(review_count as usize)
      .map(|&days| failed_on + Duration::days(days))
  }

  /// Fresh record for a first failure at `at`
  pub fn new_record(&self, user_id: i64, question_id: i64, at: DateTime<Utc>) -> ReviewRecord {
    let failed_on = self.local_date(at);
    ReviewRecord {
      id: 0,
      user_id,
      question_id,
      last_failure_at: at,
      review_count: 0,
      next_due_date: self.due_date(failed_on, 0).unwrap_or(failed_on),
      is_mastered: false,
    }
  }

  /// Reset a record to the first interval after a failure at `at`
  pub fn apply_failure(&self, record: &mut ReviewRecord, at: DateTime<Utc>) {
    let failed_on = self.local_date(at);
    record.review_count = 0;
    record.last_failure_at = at;
    record.is_mastered = false;
    record.next_due_date = self.due_date(failed_on, 0).unwrap_or(failed_on);
  }

  /// Advance or reset a record after one review answer
  pub fn apply_review(&self, record: &mut ReviewRecord, is_correct: bool, at: DateTime<Utc>) {
    if !is_correct {
      self.apply_failure(record, at);
      return;
    }

    if record.is_mastered {
      return;
    }

    record.review_count = (record.review_count + 1).min(self.mastery_count());
    let failed_on = self.local_date(record.last_failure_at);
    match self.due_date(failed_on, record.review_count) {
      Some(due) => record.next_due_date = due,
      // Table exhausted: mastered, due date frozen
      None => record.is_mastered = true,
    }
  }

  /// Create or reset the review record for a wrong answer in a graded attempt.
  pub fn record_failure<S: ReviewStore + ?Sized>(
    &self,
    store: &S,
    user_id: i64,
    question_id: i64,
    at: DateTime<Utc>,
  ) -> Result<ReviewRecord> {
    let defaults = self.new_record(user_id, question_id, at);

    let (mut record, created) = match store.find_or_create_review_record(user_id, question_id, &defaults) {
      Err(Error::UniqueViolation) => {
        tracing::warn!(
          "Review record for user {} question {} created concurrently, retrying",
          user_id,
          question_id
        );
        store.find_or_create_review_record(user_id, question_id, &defaults)?
      }
      other => other?,
    };

    if created {
      tracing::debug!(
        "Created review record for user {} question {}, due {}",
        user_id,
        question_id,
        record.next_due_date
      );
      return Ok(record);
    }

    self.apply_failure(&mut record, at);
    store.save_review_record(&record)?;
    tracing::debug!(
      "Reset review record for user {} question {}, due {}",
      user_id,
      question_id,
      record.next_due_date
    );
    Ok(record)
  }

  /// Apply one review answer and persist the result.
  pub fn mark_reviewed<S: ReviewStore + ?Sized>(
    &self,
    store: &S,
    record: &mut ReviewRecord,
    is_correct: bool,
    at: DateTime<Utc>,
  ) -> Result<()> {
    self.apply_review(record, is_correct, at);
    store.save_review_record(record)?;
    tracing::debug!(
      "Reviewed question {} (correct: {}): count {}, mastered {}, due {}",
      record.question_id,
      is_correct,
      record.review_count,
      record.is_mastered,
      record.next_due_date
    );
    Ok(())
  }

  /// Grade `choice` against the question's full answer set, then `mark_reviewed`.
  /// Returns whether the choice was correct.
  pub fn mark_answered<S: ReviewStore + ?Sized>(
    &self,
    store: &S,
    record: &mut ReviewRecord,
    question: &Question,
    choice: u8,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    let is_correct = question.is_correct_choice(choice);
    self.mark_reviewed(store, record, is_correct, at)?;
    Ok(is_correct)
  }

  /// Records due on or before `as_of` (a local calendar date), oldest due first.
  pub fn due_for_review<S: ReviewStore + ?Sized>(
    &self,
    store: &S,
    user_id: i64,
    as_of: NaiveDate,
  ) -> Result<Vec<ReviewRecord>> {
    let mut due: Vec<ReviewRecord> = store
      .query_due_records(user_id, as_of)?
      .into_iter()
      .filter(|r| r.is_due(as_of))
      .collect();
    due.sort_by_key(|r| (r.next_due_date, r.id));
    Ok(due)
  }
}
