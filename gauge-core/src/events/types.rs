//! Event type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proctoring::{RiskLevel, Severity};

/// Events emitted by the assessment core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GaugeEvent {
    /// A new assessment session was created
    SessionCreated { session_id: Uuid, user_id: String },

    /// Blueprint persisted for a session
    SessionAssembled { session_id: Uuid },

    /// Session clock started
    SessionStarted {
        session_id: Uuid,
        deadline: DateTime<Utc>,
    },

    /// An answer was recorded or overwritten
    AnswerSubmitted { session_id: Uuid, question_id: i64 },

    /// Session finished within the time limit
    SessionCompleted { session_id: Uuid, score: f64 },

    /// Session hit its deadline (lazy check or active sweep)
    SessionExpired { session_id: Uuid },

    /// A monitoring signal was ingested
    ProctoringIngested {
        session_id: Uuid,
        severity: Severity,
    },

    /// Recomputed risk level differs from the previous one
    RiskLevelChanged {
        session_id: Uuid,
        level: RiskLevel,
        suspicious_event_count: u32,
    },
}

impl GaugeEvent {
    /// The session this event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            GaugeEvent::SessionCreated { session_id, .. } => *session_id,
            GaugeEvent::SessionAssembled { session_id } => *session_id,
            GaugeEvent::SessionStarted { session_id, .. } => *session_id,
            GaugeEvent::AnswerSubmitted { session_id, .. } => *session_id,
            GaugeEvent::SessionCompleted { session_id, .. } => *session_id,
            GaugeEvent::SessionExpired { session_id } => *session_id,
            GaugeEvent::ProctoringIngested { session_id, .. } => *session_id,
            GaugeEvent::RiskLevelChanged { session_id, .. } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let event = GaugeEvent::SessionExpired {
            session_id: Uuid::nil(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"session_expired\""));
    }

    #[test]
    fn event_serialization_roundtrip() {
        let events = vec![
            GaugeEvent::SessionCreated {
                session_id: Uuid::new_v4(),
                user_id: "00058215".into(),
            },
            GaugeEvent::SessionStarted {
                session_id: Uuid::new_v4(),
                deadline: Utc::now(),
            },
            GaugeEvent::SessionCompleted {
                session_id: Uuid::new_v4(),
                score: 0.75,
            },
            GaugeEvent::RiskLevelChanged {
                session_id: Uuid::new_v4(),
                level: RiskLevel::High,
                suspicious_event_count: 6,
            },
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let parsed: GaugeEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, event);
        }
    }

    #[test]
    fn session_id_extracted_from_all_variants() {
        let id = Uuid::new_v4();
        let event = GaugeEvent::AnswerSubmitted {
            session_id: id,
            question_id: 7,
        };
        assert_eq!(event.session_id(), id);
    }
}
