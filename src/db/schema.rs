use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS questions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      subject TEXT NOT NULL,
      number INTEGER NOT NULL,
      content TEXT NOT NULL,
      -- JSON array of correct choice numbers, e.g. [2, 4]
      answers TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE IF NOT EXISTS review_schedules (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      question_id INTEGER NOT NULL,
      last_failure_at TEXT NOT NULL,
      review_count INTEGER NOT NULL DEFAULT 0,
      next_due_date TEXT NOT NULL,
      is_mastered INTEGER NOT NULL DEFAULT 0,
      UNIQUE (user_id, question_id),
      FOREIGN KEY (question_id) REFERENCES questions(id)
    );

    CREATE TABLE IF NOT EXISTS mock_exams (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      started_at TEXT NOT NULL,
      finished_at TEXT,
      score INTEGER,
      is_completed INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS mock_exam_questions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      mock_exam_id INTEGER NOT NULL,
      question_id INTEGER NOT NULL,
      subject TEXT NOT NULL,
      position INTEGER NOT NULL,
      selected_choice INTEGER,
      is_correct INTEGER NOT NULL DEFAULT 0,
      UNIQUE (mock_exam_id, question_id),
      FOREIGN KEY (mock_exam_id) REFERENCES mock_exams(id) ON DELETE CASCADE,
      FOREIGN KEY (question_id) REFERENCES questions(id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_questions_subject ON questions(subject);
    CREATE INDEX IF NOT EXISTS idx_review_schedules_due ON review_schedules(user_id, is_mastered, next_due_date);
    CREATE INDEX IF NOT EXISTS idx_mock_exams_user ON mock_exams(user_id, is_completed);
    CREATE INDEX IF NOT EXISTS idx_mock_exam_questions_exam ON mock_exam_questions(mock_exam_id, position);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: single integer answer column replaced by a JSON answer list
  if column_exists(conn, "questions", "answer") {
    add_column_if_missing(conn, "questions", "answers", "TEXT NOT NULL DEFAULT '[]'")?;
    conn.execute(
      "UPDATE questions SET answers = json_array(answer) WHERE answers = '[]' AND answer IS NOT NULL",
      [],
    )?;
  }

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();

    let tables: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
           ('questions', 'review_schedules', 'mock_exams', 'mock_exam_questions')",
        [],
        |row| row.get(0),
      )
      .unwrap();
    assert_eq!(tables, 4);
  }

  #[test]
  fn test_legacy_single_answer_migrated() {
    let conn = Connection::open_in_memory().unwrap();
    conn
      .execute_batch(
        r#"
        CREATE TABLE questions (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          subject TEXT NOT NULL,
          number INTEGER NOT NULL,
          content TEXT NOT NULL,
          answer INTEGER
        );
        INSERT INTO questions (subject, number, content, answer) VALUES ('A', 1, 'q', 3);
        "#,
      )
      .unwrap();

    run_migrations(&conn).unwrap();

    let answers: String = conn
      .query_row("SELECT answers FROM questions WHERE number = 1", [], |row| row.get(0))
      .unwrap();
    assert_eq!(answers, "[3]");
  }

  #[test]
  fn test_review_pair_is_unique() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
      .execute("INSERT INTO questions (subject, number, content) VALUES ('A', 1, 'q')", [])
      .unwrap();

    let insert = "INSERT INTO review_schedules (user_id, question_id, last_failure_at, next_due_date)
                  VALUES (1, 1, '2024-01-10T00:00:00+00:00', '2024-01-11')";
    conn.execute(insert, []).unwrap();
    assert!(conn.execute(insert, []).is_err());
  }
}
