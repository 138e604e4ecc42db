//! External operations facade

mod retry;
mod service;
mod views;

pub use retry::RetryPolicy;
pub use service::AssessmentService;
pub use views::{AnswerView, QuestionView};
