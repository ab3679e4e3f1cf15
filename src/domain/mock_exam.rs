use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated mock-exam session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockExam {
  pub id: i64,
  pub user_id: i64,
  pub started_at: DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
  /// Percentage score, set on submission
  pub score: Option<u32>,
  pub is_completed: bool,
}

/// A question slot within a mock exam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockExamQuestion {
  pub id: i64,
  pub mock_exam_id: i64,
  pub question_id: i64,
  pub subject: String,
  /// Zero-based position in the exam
  pub position: i64,
  pub selected_choice: Option<u8>,
  pub is_correct: bool,
}

/// Questions drawn for a single subject, in draw order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectBlock {
  pub subject: String,
  pub question_ids: Vec<i64>,
}

/// Sampled question set, grouped by subject in the requested order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDraft {
  pub blocks: Vec<SubjectBlock>,
}

impl ExamDraft {
  pub fn len(&self) -> usize {
    self.blocks.iter().map(|b| b.question_ids.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Question ids in exam order
  pub fn question_ids(&self) -> Vec<i64> {
    self
      .blocks
      .iter()
      .flat_map(|b| b.question_ids.iter().copied())
      .collect()
  }

  /// (subject, question_id) pairs in exam order
  pub fn entries(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
    self
      .blocks
      .iter()
      .flat_map(|b| b.question_ids.iter().map(move |&id| (b.subject.as_str(), id)))
  }
}

/// Result of grading a submitted mock exam
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamOutcome {
  pub exam_id: i64,
  pub total: usize,
  pub answered: usize,
  pub correct: usize,
  pub score: u32,
  /// Questions answered wrong; each got its review record reset
  pub failed_question_ids: Vec<i64>,
}

impl ExamOutcome {
  /// Integer percentage of correct answers over all questions in the exam
  pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
      0
    } else {
      (correct * 100 / total) as u32
    }
  }
}
