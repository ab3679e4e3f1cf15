//! exam-review CLI
//!
//! Maintenance commands for the review scheduler and mock-exam database.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exam_review::config::Settings;
use exam_review::db;
use exam_review::domain::ReviewState;
use exam_review::services;
use exam_review::srs::{ReviewScheduler, WeightedExamSampler};

#[derive(Parser)]
#[command(name = "exam-review")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Review scheduling and mock-exam generation for tree-doctor exam prep")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create or upgrade the database schema
  Migrate,

  /// Import questions from a JSON file
  Import {
    /// Path to a JSON array of questions
    file: PathBuf,
  },

  /// Generate a mock exam for a user
  Generate {
    #[arg(long)]
    user: i64,
  },

  /// List reviews due for a user
  Due {
    #[arg(long)]
    user: i64,
    /// Local date to check (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// Show per-subject accuracy from completed mock exams
  Stats {
    #[arg(long)]
    user: i64,
  },
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exam_review=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let cli = Cli::parse();
  let settings = Settings::load().context("Failed to load settings")?;

  let pool = db::init_db(&settings.database_path)
    .with_context(|| format!("Failed to open {}", settings.database_path.display()))?;
  let mut conn = db::try_lock(&pool)?;
  let scheduler = ReviewScheduler::with_timezone(settings.utc_offset);

  match cli.command {
    Commands::Migrate => {
      println!("Database ready at {}", settings.database_path.display());
    }
    Commands::Import { file } => {
      let count = services::import::import_questions_file(&mut conn, &file)?;
      println!("Imported {} questions from {}", count, file.display());
    }
    Commands::Generate { user } => {
      let exam_id = services::generate_mock_exam(
        &mut conn,
        &WeightedExamSampler::default(),
        &mut rand::rng(),
        user,
        settings.subject_order.as_slice(),
        settings.questions_per_subject,
        Utc::now(),
      )?;

      let slots = db::get_mock_exam_questions(&conn, exam_id)?;
      println!("Mock exam {} ({} questions)", exam_id, slots.len());
      for subject in &settings.subject_order {
        let n = slots.iter().filter(|s| &s.subject == subject).count();
        println!("  {}: {}", subject, n);
      }
    }
    Commands::Due { user, date } => {
      let as_of = date.unwrap_or_else(|| scheduler.today());
      let due = services::due_reviews(&conn, &scheduler, user, as_of)?;

      if due.is_empty() {
        println!("No reviews due on {}", as_of);
      }
      for item in due {
        let state = item.record.state();
        let progress = match state {
          ReviewState::Active { review_count } => format!("{} {}/{}", state.as_str(), review_count, scheduler.mastery_count()),
          ReviewState::Mastered => state.as_str().to_string(),
        };
        println!(
          "[{}] {} #{} (due {}, {})",
          item.question.id,
          item.question.subject,
          item.question.number,
          item.record.next_due_date,
          progress
        );
      }
    }
    Commands::Stats { user } => {
      let stats = db::subject_accuracy(&conn, user)?;
      if stats.is_empty() {
        println!("No completed mock exams");
      }
      for s in &stats {
        println!("{}: {}/{} ({:.1}%)", s.subject, s.correct, s.total, s.percent());
      }
      if let Some(weakest) = db::weakest_subject(&stats) {
        println!("Weakest subject: {}", weakest.subject);
      }

      println!("Active reviews: {}", db::count_active_reviews(&conn, user)?);
      for exam in db::recent_mock_exams(&conn, user, 5)? {
        let score = exam.score.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
        println!("Exam {} started {} score {}", exam.id, exam.started_at.format("%Y-%m-%d %H:%M"), score);
      }
    }
  }

  Ok(())
}
