//! Review-session operations, one transaction per read-modify-write.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

use crate::db;
use crate::domain::{Question, ReviewRecord};
use crate::error::{Error, Result};
use crate::srs::ReviewScheduler;

/// A due review together with the question to show
#[derive(Debug, Clone)]
pub struct DueReview {
    pub record: ReviewRecord,
    pub question: Question,
}

/// Create or reset the review record for a wrong graded answer.
pub fn record_failure(
    conn: &mut Connection,
    scheduler: &ReviewScheduler,
    user_id: i64,
    question_id: i64,
    at: DateTime<Utc>,
) -> Result<ReviewRecord> {
    let tx = conn.transaction()?;
    let record = scheduler.record_failure(&*tx, user_id, question_id, at)?;
    tx.commit()?;
    Ok(record)
}

/// Grade one answer given during a review session and advance or reset the record.
/// Returns the updated record and whether the answer was correct.
pub fn submit_review_answer(
    conn: &mut Connection,
    scheduler: &ReviewScheduler,
    user_id: i64,
    question_id: i64,
    choice: u8,
    at: DateTime<Utc>,
) -> Result<(ReviewRecord, bool)> {
    if !Question::is_valid_choice(choice) {
        return Err(Error::InvalidChoice { question_id, choice });
    }

    let tx = conn.transaction()?;
    let mut record = db::get_review_record(&tx, user_id, question_id)?
        .ok_or(Error::NotFound("review record", question_id))?;
    let question = db::get_question_by_id(&tx, question_id)?
        .ok_or(Error::NotFound("question", question_id))?;

    let is_correct = scheduler.mark_answered(&*tx, &mut record, &question, choice, at)?;
    tx.commit()?;
    Ok((record, is_correct))
}

/// Reviews due on `as_of` with their questions, oldest due first.
pub fn due_reviews(
    conn: &Connection,
    scheduler: &ReviewScheduler,
    user_id: i64,
    as_of: NaiveDate,
) -> Result<Vec<DueReview>> {
    scheduler
        .due_for_review(conn, user_id, as_of)?
        .into_iter()
        .map(|record| {
            let question = db::get_question_by_id(conn, record.question_id)?
                .ok_or(Error::NotFound("question", record.question_id))?;
            Ok::<_, Error>(DueReview { record, question })
        })
        .collect()
}
