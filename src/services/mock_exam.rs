//! Mock exam generation and grading.
//!
//! Each operation runs inside one transaction: generation persists the exam
//! and all of its slots together, grading stores answers, the score and the
//! review-schedule resets together.

use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::Connection;
use std::collections::HashMap;

use crate::db::{self, ExamStore};
use crate::domain::{ExamOutcome, Question};
use crate::error::{Error, Result};
use crate::srs::{ReviewScheduler, WeightedExamSampler};

/// Sample a new mock exam for `user_id` and persist it. Returns the exam id.
pub fn generate_mock_exam<R, S>(
    conn: &mut Connection,
    sampler: &WeightedExamSampler,
    rng: &mut R,
    user_id: i64,
    subject_order: &[S],
    per_subject_count: usize,
    at: DateTime<Utc>,
) -> Result<i64>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let tx = conn.transaction()?;

    let mut pool_by_subject = HashMap::new();
    for subject in subject_order {
        let subject = subject.as_ref();
        pool_by_subject.insert(subject.to_string(), tx.fetch_question_pool(subject)?);
    }
    let seen = tx.fetch_previously_seen_question_ids(user_id)?;

    let draft = sampler.sample(rng, subject_order, &pool_by_subject, &seen, per_subject_count)?;
    let exam_id = tx.persist_sampled_exam(user_id, &draft, at)?;
    tx.commit()?;

    tracing::info!(
        "Generated mock exam {} for user {}: {} questions across {} subjects ({} previously seen)",
        exam_id,
        user_id,
        draft.len(),
        draft.blocks.len(),
        seen.len()
    );
    Ok(exam_id)
}

/// Grade a submitted mock exam.
///
/// `answers` maps question id to the chosen option. Unanswered questions
/// count toward the total but are neither correct nor scheduled for review.
/// Every answered-but-wrong question gets its review record created or reset.
pub fn submit_mock_exam(
    conn: &mut Connection,
    scheduler: &ReviewScheduler,
    exam_id: i64,
    user_id: i64,
    answers: &HashMap<i64, u8>,
    at: DateTime<Utc>,
) -> Result<ExamOutcome> {
    for (&question_id, &choice) in answers {
        if !Question::is_valid_choice(choice) {
            return Err(Error::InvalidChoice { question_id, choice });
        }
    }

    let tx = conn.transaction()?;

    let exam = db::get_mock_exam(&tx, exam_id, user_id)?.ok_or(Error::NotFound("mock exam", exam_id))?;
    if exam.is_completed {
        return Err(Error::ExamAlreadyCompleted(exam_id));
    }

    let slots = db::get_mock_exam_questions(&tx, exam_id)?;
    let mut answered = 0;
    let mut correct = 0;
    let mut failed_question_ids = Vec::new();

    for slot in &slots {
        let Some(&choice) = answers.get(&slot.question_id) else {
            continue;
        };
        let question = db::get_question_by_id(&tx, slot.question_id)?
            .ok_or(Error::NotFound("question", slot.question_id))?;

        let is_correct = question.is_correct_choice(choice);
        db::record_answer(&tx, slot.id, choice, is_correct)?;
        answered += 1;
        if is_correct {
            correct += 1;
        } else {
            scheduler.record_failure(&*tx, user_id, question.id, at)?;
            failed_question_ids.push(question.id);
        }
    }

    let score = ExamOutcome::percentage(correct, slots.len());
    db::complete_mock_exam(&tx, exam_id, score, at)?;
    tx.commit()?;

    tracing::info!(
        "Submitted mock exam {} for user {}: {}/{} correct ({} answered), score {}",
        exam_id,
        user_id,
        correct,
        slots.len(),
        answered,
        score
    );

    Ok(ExamOutcome {
        exam_id,
        total: slots.len(),
        answered,
        correct,
        score,
        failed_question_ids,
    })
}
