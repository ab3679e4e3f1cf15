//! Per-subject answer statistics from completed mock exams

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::Result;

/// Answer accuracy for one subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAccuracy {
    pub subject: String,
    pub total: i64,
    pub correct: i64,
}

impl SubjectAccuracy {
    /// Accuracy in percent, rounded to one decimal place
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.correct as f64 / self.total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        }
    }
}

/// Accuracy per subject over every answered question in completed exams
pub fn subject_accuracy(conn: &Connection, user_id: i64) -> Result<Vec<SubjectAccuracy>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT q.subject, COUNT(*), SUM(CASE WHEN q.is_correct = 1 THEN 1 ELSE 0 END)
    FROM mock_exam_questions q
    JOIN mock_exams e ON q.mock_exam_id = e.id
    WHERE e.user_id = ?1 AND e.is_completed = 1 AND q.selected_choice IS NOT NULL
    GROUP BY q.subject
    ORDER BY q.subject ASC
    "#,
    )?;

    let stats = stmt
        .query_map(params![user_id], |row| {
            Ok(SubjectAccuracy {
                subject: row.get(0)?,
                total: row.get(1)?,
                correct: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(stats)
}

/// Subject with the lowest accuracy; the first one wins ties
pub fn weakest_subject(stats: &[SubjectAccuracy]) -> Option<&SubjectAccuracy> {
    stats.iter().fold(None, |weakest: Option<&SubjectAccuracy>, s| match weakest {
        Some(w) if w.percent() <= s.percent() => Some(w),
        _ => Some(s),
    })
}
