//! Application configuration constants.
//!
//! Scheduling and sampling constants live here as compile-time values;
//! deployment settings (database path, local time zone, subject order)
//! are loaded at startup with priority: config.toml > .env/environment > default.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// ==================== Review Schedule ====================

/// Days from the last failure until each successive review (forgetting curve)
pub const REVIEW_INTERVALS_DAYS: [i64; 5] = [1, 3, 7, 14, 30];

// ==================== Mock Exam ====================

/// Questions drawn per subject for one mock exam
pub const QUESTIONS_PER_SUBJECT: usize = 25;

/// Selection weight for questions never served in a completed mock exam
pub const UNSEEN_WEIGHT: u32 = 3;

/// Selection weight for questions already served in a completed mock exam
pub const SEEN_WEIGHT: u32 = 1;

/// Subject order of the tree-doctor exam:
/// Pathology, Entomology, Physiology, Soil Science, Arboriculture Management
pub const DEFAULT_SUBJECT_ORDER: [&str; 5] = [
  "수목병리학",
  "수목해충학",
  "수목생리학",
  "산림토양학",
  "수목관리학",
];

/// Valid answer choices are numbered 1 through 5
pub const MIN_CHOICE: u8 = 1;
pub const MAX_CHOICE: u8 = 5;

// ==================== Time Zone ====================

/// Korea Standard Time, in seconds east of UTC
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 9 * 3600;

// ==================== Runtime Settings ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
  database: Option<DatabaseSection>,
  schedule: Option<ScheduleSection>,
  mock_exam: Option<MockExamSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleSection {
  utc_offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MockExamSection {
  subjects: Option<Vec<String>>,
  per_subject: Option<usize>,
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
  pub database_path: PathBuf,
  pub utc_offset: FixedOffset,
  pub subject_order: Vec<String>,
  pub questions_per_subject: usize,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_path: PathBuf::from("data/exam_review.db"),
      utc_offset: default_offset(),
      subject_order: DEFAULT_SUBJECT_ORDER.iter().map(|s| s.to_string()).collect(),
      questions_per_subject: QUESTIONS_PER_SUBJECT,
    }
  }
}

pub(crate) fn default_offset() -> FixedOffset {
  FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

impl Settings {
  /// Load settings from `config.toml` in the working directory, then the environment.
  pub fn load() -> Result<Self> {
    let _ = dotenvy::dotenv();
    Self::load_from(Path::new("config.toml"), |key| std::env::var(key).ok())
  }

  /// Load settings from an explicit file and environment lookup.
  pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let file = match std::fs::read_to_string(path) {
      Ok(contents) => toml::from_str::<FileConfig>(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?,
      Err(_) => FileConfig::default(),
    };

    let mut settings = Settings::default();

    // Priority 1: config.toml
    let file_db = file.database.and_then(|d| d.path);
    let file_offset = file.schedule.and_then(|s| s.utc_offset);
    if let Some(exam) = file.mock_exam {
      if let Some(subjects) = exam.subjects {
        settings.subject_order = subjects;
      }
      if let Some(n) = exam.per_subject {
        settings.questions_per_subject = n;
      }
    }

    // Priority 2: environment
    match file_db.or_else(|| env("DATABASE_PATH")) {
      Some(path) => {
        tracing::info!("Using database: {}", path);
        settings.database_path = PathBuf::from(path);
      }
      None => tracing::info!("Using default database path: {}", settings.database_path.display()),
    }

    if let Some(raw) = file_offset.or_else(|| env("REVIEW_UTC_OFFSET")) {
      settings.utc_offset = parse_utc_offset(&raw)?;
    }

    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = settings.subject_order.iter().find(|s| !seen.insert(s.as_str())) {
      return Err(Error::Config(format!("subject '{}' listed more than once", dup)));
    }

    if settings.questions_per_subject == 0 {
      return Err(Error::Config("per_subject must be at least 1".into()));
    }

    Ok(settings)
  }
}

/// Parse an offset such as `+09:00`, `-05:30` or `Z`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
  let raw = raw.trim();
  if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
    return Ok(Utc.fix());
  }

  raw
    .parse::<FixedOffset>()
    .map_err(|e| Error::Config(format!("invalid UTC offset '{}': {}", raw, e)))
}
