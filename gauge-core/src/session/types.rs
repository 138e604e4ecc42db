//! Session, answer and completion types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::proctoring::RiskLevel;

/// Questions per session: 8 topics, one question per tier
pub const QUESTIONS_PER_SESSION: u32 = 24;

/// Default attempt time limit, minutes
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 40;

/// Lifecycle state of an assessment attempt
///
/// `created → started → {completed | expired}`; both end states are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Started,
    Completed,
    Expired,
}

impl SessionStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "started" => Some(Self::Started),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }
}

/// One timed assessment attempt by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub specialization_id: i64,
    pub status: SessionStatus,
    /// Fixed at creation; the deadline derives from it once started
    pub time_limit_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub score: Option<f64>,
    pub risk_level: RiskLevel,
    pub suspicious_event_count: u32,
}

impl Session {
    /// Create a session in the `created` state
    pub fn new(
        user_id: impl Into<String>,
        specialization_id: i64,
        time_limit_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            specialization_id,
            status: SessionStatus::Created,
            time_limit_minutes,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            expired: false,
            score: None,
            risk_level: RiskLevel::Low,
            suspicious_event_count: 0,
        }
    }

    /// Submission deadline, available once the clock has started
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .map(|t| t + Duration::minutes(i64::from(self.time_limit_minutes)))
    }

    /// Pure expiry check: a started session at or past its deadline
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Started && self.deadline().is_some_and(|d| now >= d)
    }

    /// Start the attempt clock. Valid only from `created`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>, SessionError> {
        if self.status != SessionStatus::Created {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Created.as_str().to_string(),
                actual: self.status.as_str().to_string(),
            });
        }
        self.started_at = Some(now);
        self.status = SessionStatus::Started;
        Ok(now + Duration::minutes(i64::from(self.time_limit_minutes)))
    }

    /// Force the terminal expired state. Callers check `is_expired_at`
    /// under the session's exclusive lock first.
    pub fn mark_expired(&mut self) {
        self.status = SessionStatus::Expired;
        self.expired = true;
    }
}

/// A recorded answer, unique per (session, question)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: i64,
    pub option_index: u8,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Qualification level derived from the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationLevel {
    Junior,
    Middle,
    Senior,
}

impl QualificationLevel {
    /// Level thresholds: 80% and above is senior, 50% and above is middle
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Senior
        } else if percentage >= 50.0 {
            Self::Middle
        } else {
            Self::Junior
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Junior => "Junior",
            Self::Middle => "Middle",
            Self::Senior => "Senior",
        }
    }
}

/// Result of a successful completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub score: f64,
    pub correct_count: u32,
    pub max_score: u32,
    pub level: QualificationLevel,
    pub recommendation: String,
}

impl CompletionSummary {
    pub fn from_correct_count(correct_count: u32) -> Self {
        let score = f64::from(correct_count) / f64::from(QUESTIONS_PER_SESSION);
        let level = QualificationLevel::from_percentage(score * 100.0);
        let recommendation = format!(
            "You demonstrated {} level with {}/{} correct answers. \
             Keep developing in your chosen direction and pay attention to practical skills.",
            level.display_name(),
            correct_count,
            QUESTIONS_PER_SESSION
        );
        Self {
            score,
            correct_count,
            max_score: QUESTIONS_PER_SESSION,
            level,
            recommendation,
        }
    }
}
