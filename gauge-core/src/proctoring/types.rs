//! Monitoring signal and risk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity reported by the monitor for a single signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Whether this severity counts toward the high/critical thresholds
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Discrete session risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Kind of monitoring signal reported for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Browser tab hidden
    TabHidden,
    /// Assessment window lost focus
    FocusLost,
    /// Fullscreen mode exited
    FullscreenExit,
    /// No face visible to the camera
    NoFace,
    /// More than one face visible
    MultipleFaces,
    /// Speech detected that is not the assessed user
    VoiceDetected,
    /// Copy to clipboard attempted
    ClipboardCopy,
    /// Developer tools opened
    DevtoolsOpened,
}

impl SignalKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TabHidden => "tab_hidden",
            Self::FocusLost => "focus_lost",
            Self::FullscreenExit => "fullscreen_exit",
            Self::NoFace => "no_face",
            Self::MultipleFaces => "multiple_faces",
            Self::VoiceDetected => "voice_detected",
            Self::ClipboardCopy => "clipboard_copy",
            Self::DevtoolsOpened => "devtools_opened",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tab_hidden" => Some(Self::TabHidden),
            "focus_lost" => Some(Self::FocusLost),
            "fullscreen_exit" => Some(Self::FullscreenExit),
            "no_face" => Some(Self::NoFace),
            "multiple_faces" => Some(Self::MultipleFaces),
            "voice_detected" => Some(Self::VoiceDetected),
            "clipboard_copy" => Some(Self::ClipboardCopy),
            "devtools_opened" => Some(Self::DevtoolsOpened),
            _ => None,
        }
    }
}

/// A single monitoring event. Append-only; only the audit fields
/// (`resolved`, `reviewer`, `notes`) ever change after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctoringEvent {
    pub id: u64,
    pub session_id: Uuid,
    pub kind: SignalKind,
    pub severity: Severity,
    pub details: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub reviewer: Option<String>,
    pub notes: Option<String>,
}

/// Aggregate risk state of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub risk_level: RiskLevel,
    pub suspicious_event_count: u32,
}

/// Classify a session from its full event history.
///
/// Rules are evaluated top-down; the first match wins:
/// 1. critical: 10 or more high/critical events
/// 2. high: 5 or more high/critical events
/// 3. medium: 15 or more events of any severity
/// 4. low otherwise
///
/// Resolution status is deliberately ignored; risk reflects everything that
/// was ever observed.
pub fn compute_risk(events: &[ProctoringEvent]) -> RiskSummary {
    let total = events.len();
    let severe = events.iter().filter(|e| e.severity.is_severe()).count();

    let risk_level = if severe >= 10 {
        RiskLevel::Critical
    } else if severe >= 5 {
        RiskLevel::High
    } else if total >= 15 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskSummary {
        risk_level,
        suspicious_event_count: total as u32,
    }
}
