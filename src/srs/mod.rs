pub mod interval;
pub mod sampler;

pub use interval::ReviewScheduler;
pub use sampler::{weighted_draw_without_replacement, QuestionWeight, WeightedExamSampler};
