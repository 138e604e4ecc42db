//! Blueprint types
//!
//! A blueprint is the immutable ordered set of 8 topics and 24 questions
//! fixed at assembly time. It is written once and read-only afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Question;

/// One topic bound to a session, `order` in 1..=8
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub session_id: Uuid,
    pub topic_id: i64,
    pub competency_id: i64,
    pub order: u8,
}

/// One question slot of the canonical 24-item sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintEntry {
    pub order: u8,
    pub topic_id: i64,
    pub competency_id: i64,
    pub question: Question,
}

/// The canonical question sequence of a session, sorted by
/// (topic order ascending, tier rank ascending)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub session_id: Uuid,
    pub entries: Vec<BlueprintEntry>,
}

impl Blueprint {
    /// Build from resolved entries, enforcing the canonical order
    pub fn new(session_id: Uuid, mut entries: Vec<BlueprintEntry>) -> Self {
        entries.sort_by_key(|e| (e.order, e.question.tier.rank()));
        Self {
            session_id,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a question belongs to this blueprint
    pub fn contains_question(&self, question_id: i64) -> bool {
        self.entries.iter().any(|e| e.question.id == question_id)
    }

    /// Distinct topic ids in presentation order
    pub fn topic_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for entry in &self.entries {
            if ids.last() != Some(&entry.topic_id) {
                ids.push(entry.topic_id);
            }
        }
        ids
    }
}
