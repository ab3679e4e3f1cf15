//! Application services.
//!
//! Transaction boundaries around the scheduler and sampler, for use by
//! request handlers and the CLI.

pub mod import;
pub mod mock_exam;
pub mod review;

pub use mock_exam::{generate_mock_exam, submit_mock_exam};
pub use review::{due_reviews, record_failure, submit_review_answer, DueReview};
