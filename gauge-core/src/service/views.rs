//! Presentation views handed to the boundary layer

use serde::{Deserialize, Serialize};

use crate::catalog::Tier;

/// A question as shown to the assessed user.
///
/// The correct option is deliberately absent; correctness only surfaces
/// through submitted answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub question_id: i64,
    /// Topic position, 1..=8
    pub order: u8,
    pub tier: Tier,
    pub topic_id: i64,
    pub topic_name: String,
    pub competency_id: i64,
    pub competency_name: String,
    pub text: String,
    pub options: [String; 4],
    /// Present once the user has answered this question
    pub answer: Option<AnswerView>,
}

/// The recorded answer attached to a question view
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnswerView {
    pub option_index: u8,
    pub is_correct: bool,
}
