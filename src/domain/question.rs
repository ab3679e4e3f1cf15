use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config;

/// A multiple-choice exam question.
///
/// Questions can have more than one correct choice; any member of
/// `correct_choices` counts as a correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id: i64,
  pub subject: String,
  pub number: i64,
  pub content: String,
  pub correct_choices: BTreeSet<u8>,
}

impl Question {
  pub fn new(subject: String, number: i64, content: String, correct_choices: BTreeSet<u8>) -> Self {
    Self {
      id: 0,
      subject,
      number,
      content,
      correct_choices,
    }
  }

  pub fn is_correct_choice(&self, choice: u8) -> bool {
    self.correct_choices.contains(&choice)
  }

  /// True if `choice` is one of the numbered options a question can have
  pub fn is_valid_choice(choice: u8) -> bool {
    (config::MIN_CHOICE..=config::MAX_CHOICE).contains(&choice)
  }
}
