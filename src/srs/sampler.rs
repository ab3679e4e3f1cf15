//! Weighted mock-exam question sampling.
//!
//! Questions the learner has not met in a completed mock exam are favoured
//! over ones they have, so repeated mock exams keep surfacing new material.

use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::config;
use crate::domain::{ExamDraft, Question, SubjectBlock};
use crate::error::{Error, Result};

/// A candidate question with its selection weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionWeight {
  pub question_id: i64,
  pub weight: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct WeightedExamSampler {
  pub unseen_weight: u32,
  pub seen_weight: u32,
}

impl Default for WeightedExamSampler {
  fn default() -> Self {
    Self {
      unseen_weight: config::UNSEEN_WEIGHT,
      seen_weight: config::SEEN_WEIGHT,
    }
  }
}

impl WeightedExamSampler {
  pub fn weight_for(&self, question_id: i64, previously_seen: &HashSet<i64>) -> u32 {
    if previously_seen.contains(&question_id) {
      self.seen_weight
    } else {
      self.unseen_weight
    }
  }

  /// Build one mock exam: up to `per_subject_count` questions per subject,
  /// grouped in `subject_order`, each question at most once.
  ///
  /// Fails with `Error::EmptyPool` when no subject has any candidate.
  pub fn sample<R, S>(
    &self,
    rng: &mut R,
    subject_order: &[S],
    pool_by_subject: &HashMap<String, Vec<Question>>,
    previously_seen: &HashSet<i64>,
    per_subject_count: usize,
  ) -> Result<ExamDraft>
  where
    R: Rng + ?Sized,
    S: AsRef<str>,
  {
    let mut taken: HashSet<i64> = HashSet::new();
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut draft = ExamDraft::default();

    for subject in subject_order {
      let subject = subject.as_ref();
      // One block per subject, at its first position in the order
      if !emitted.insert(subject) {
        continue;
      }
      let Some(pool) = pool_by_subject.get(subject) else {
        continue;
      };

      let mut candidates: Vec<QuestionWeight> = Vec::with_capacity(pool.len());
      for q in pool {
        if taken.contains(&q.id) || candidates.iter().any(|c| c.question_id == q.id) {
          continue;
        }
        candidates.push(QuestionWeight {
          question_id: q.id,
          weight: self.weight_for(q.id, previously_seen),
        });
      }
      if candidates.is_empty() {
        continue;
      }

      let drawn = weighted_draw_without_replacement(rng, candidates, per_subject_count);
      tracing::debug!("Drew {} of {} questions for {}", drawn.len(), pool.len(), subject);

      taken.extend(drawn.iter().copied());
      draft.blocks.push(SubjectBlock {
        subject: subject.to_string(),
        question_ids: drawn,
      });
    }

    if draft.is_empty() {
      return Err(Error::EmptyPool);
    }
    Ok(draft)
  }
}

/// Draw up to `count` ids without replacement, each draw proportional to the
/// remaining weights. Items are picked by walking the remaining list until
/// the cumulative weight passes a uniform target in `[0, total)`.
pub fn weighted_draw_without_replacement<R: Rng + ?Sized>(
  rng: &mut R,
  mut available: Vec<QuestionWeight>,
  count: usize,
) -> Vec<i64> {
  let target_len = count.min(available.len());
  let mut selected = Vec::with_capacity(target_len);

  while selected.len() < target_len {
    let total: u64 = available.iter().map(|w| w.weight as u64).sum();
    if total == 0 {
      // Nothing weighted left to pick from
      break;
    }

    let target = rng.random_range(0..total);
    let mut cumulative = 0u64;
    let mut picked = available.len() - 1;
    for (i, w) in available.iter().enumerate() {
      cumulative += w.weight as u64;
      if target < cumulative {
        picked = i;
        break;
      }
    }

    selected.push(available.remove(picked).question_id);
  }

  selected
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn q(id: i64, subject: &str) -> Question {
    Question {
      id,
      subject: subject.into(),
      number: id,
      content: String::new(),
      correct_choices: [1].into_iter().collect(),
    }
  }

  fn pool(layout: &[(&str, std::ops::Range<i64>)]) -> HashMap<String, Vec<Question>> {
    layout
      .iter()
      .map(|(subject, ids)| (subject.to_string(), ids.clone().map(|id| q(id, subject)).collect()))
      .collect()
  }

  fn subject_of(id: i64, pools: &HashMap<String, Vec<Question>>) -> String {
    pools
      .iter()
      .find(|(_, qs)| qs.iter().any(|q| q.id == id))
      .map(|(s, _)| s.clone())
      .unwrap()
  }

  #[test]
  fn test_default_weights_are_three_to_one() {
    let sampler = WeightedExamSampler::default();
    let seen: HashSet<i64> = [1].into_iter().collect();
    assert_eq!(sampler.weight_for(1, &seen), 1);
    assert_eq!(sampler.weight_for(2, &seen), 3);
  }

  #[test]
  fn test_two_subject_scenario() {
    let pools = pool(&[("A", 0..30), ("B", 100..102)]);
    let mut rng = StdRng::seed_from_u64(7);

    let draft = WeightedExamSampler::default()
      .sample(&mut rng, &["A", "B"], &pools, &HashSet::new(), 25)
      .unwrap();

    assert_eq!(draft.blocks.len(), 2);
    assert_eq!(draft.blocks[0].subject, "A");
    assert_eq!(draft.blocks[0].question_ids.len(), 25);
    assert_eq!(draft.blocks[1].subject, "B");
    assert_eq!(draft.blocks[1].question_ids.len(), 2);
    assert_eq!(draft.len(), 27);

    let ids = draft.question_ids();
    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
  }

  #[test]
  fn test_small_subject_takes_everything() {
    let pools = pool(&[("A", 0..3)]);
    let mut rng = StdRng::seed_from_u64(1);

    let draft = WeightedExamSampler::default()
      .sample(&mut rng, &["A"], &pools, &HashSet::new(), 25)
      .unwrap();

    let mut ids = draft.question_ids();
    ids.sort();
    assert_eq!(ids, vec![0, 1, 2]);
  }

  #[test]
  fn test_empty_pool_errors() {
    let mut rng = StdRng::seed_from_u64(1);
    let sampler = WeightedExamSampler::default();

    let empty = HashMap::new();
    assert!(matches!(
      sampler.sample(&mut rng, &["A", "B"], &empty, &HashSet::new(), 25),
      Err(Error::EmptyPool)
    ));

    let hollow = pool(&[("A", 0..0)]);
    assert!(matches!(
      sampler.sample(&mut rng, &["A"], &hollow, &HashSet::new(), 25),
      Err(Error::EmptyPool)
    ));

    // Subjects outside the requested order are not used
    let other = pool(&[("C", 0..5)]);
    assert!(matches!(
      sampler.sample(&mut rng, &["A"], &other, &HashSet::new(), 25),
      Err(Error::EmptyPool)
    ));
  }

  #[test]
  fn test_subject_order_is_caller_supplied_and_blocks_match() {
    let pools = pool(&[("A", 0..10), ("B", 10..20), ("C", 20..30)]);
    let order = ["C", "missing", "A", "B"];

    for seed in 0..20 {
      let mut rng = StdRng::seed_from_u64(seed);
      let draft = WeightedExamSampler::default()
        .sample(&mut rng, &order, &pools, &HashSet::new(), 4)
        .unwrap();

      let subjects: Vec<&str> = draft.blocks.iter().map(|b| b.subject.as_str()).collect();
      assert_eq!(subjects, vec!["C", "A", "B"]);
      for (subject, id) in draft.entries() {
        assert_eq!(subject_of(id, &pools), subject);
      }
    }
  }

  #[test]
  fn test_repeated_subject_yields_one_block() {
    let pools = pool(&[("A", 0..30), ("B", 30..40)]);
    let mut rng = StdRng::seed_from_u64(11);

    let draft = WeightedExamSampler::default()
      .sample(&mut rng, &["A", "B", "A"], &pools, &HashSet::new(), 25)
      .unwrap();

    let subjects: Vec<&str> = draft.blocks.iter().map(|b| b.subject.as_str()).collect();
    assert_eq!(subjects, vec!["A", "B"]);
    assert_eq!(draft.blocks[0].question_ids.len(), 25);
    assert_eq!(draft.len(), 35);
  }

  #[test]
  fn test_no_duplicates_even_with_duplicate_pool_entries() {
    let mut pools = pool(&[("A", 0..5), ("B", 5..8)]);
    // Question 3 listed twice in A and also under B
    pools.get_mut("A").unwrap().push(q(3, "A"));
    pools.get_mut("B").unwrap().push(q(3, "A"));

    for seed in 0..20 {
      let mut rng = StdRng::seed_from_u64(seed);
      let draft = WeightedExamSampler::default()
        .sample(&mut rng, &["A", "B"], &pools, &HashSet::new(), 25)
        .unwrap();

      let ids = draft.question_ids();
      let unique: HashSet<i64> = ids.iter().copied().collect();
      assert_eq!(unique.len(), ids.len());
      assert_eq!(draft.len(), 8);
      assert_eq!(draft.blocks[0].question_ids.len(), 5);
    }
  }

  #[test]
  fn test_same_seed_same_draw() {
    let pools = pool(&[("A", 0..50)]);
    let sampler = WeightedExamSampler::default();
    let seen: HashSet<i64> = (0..25).collect();

    let a = sampler
      .sample(&mut StdRng::seed_from_u64(99), &["A"], &pools, &seen, 10)
      .unwrap();
    let b = sampler
      .sample(&mut StdRng::seed_from_u64(99), &["A"], &pools, &seen, 10)
      .unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn test_unseen_questions_are_favoured() {
    // 10 seen (weight 1) and 10 unseen (weight 3); draw 1 many times.
    // Expected unseen share is 30 / 40 = 0.75.
    let pools = pool(&[("A", 0..20)]);
    let seen: HashSet<i64> = (0..10).collect();
    let sampler = WeightedExamSampler::default();
    let mut rng = StdRng::seed_from_u64(2024);

    let trials = 4000;
    let mut unseen = 0;
    for _ in 0..trials {
      let draft = sampler.sample(&mut rng, &["A"], &pools, &seen, 1).unwrap();
      if draft.question_ids()[0] >= 10 {
        unseen += 1;
      }
    }

    let share = unseen as f64 / trials as f64;
    assert!((share - 0.75).abs() < 0.04, "unseen share {}", share);
  }

  #[test]
  fn test_draw_respects_zero_weights() {
    let mut rng = StdRng::seed_from_u64(3);
    let weights = vec![
      QuestionWeight { question_id: 1, weight: 0 },
      QuestionWeight { question_id: 2, weight: 5 },
    ];
    // Only the weighted item can ever be drawn, then the draw stops
    assert_eq!(weighted_draw_without_replacement(&mut rng, weights, 2), vec![2]);
  }

  #[test]
  fn test_draw_count_zero() {
    let mut rng = StdRng::seed_from_u64(3);
    let weights = vec![QuestionWeight { question_id: 1, weight: 3 }];
    assert!(weighted_draw_without_replacement(&mut rng, weights, 0).is_empty());
  }
}
