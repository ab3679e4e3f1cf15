pub mod mock_exam;
pub mod question;
pub mod review;

pub use mock_exam::{ExamDraft, ExamOutcome, MockExam, MockExamQuestion, SubjectBlock};
pub use question::Question;
pub use review::{ReviewRecord, ReviewState};
