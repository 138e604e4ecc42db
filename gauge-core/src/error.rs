//! Error types for gauge-core

use thiserror::Error;
use uuid::Uuid;

use crate::assembly::AssemblyError;
use crate::catalog::CatalogError;
use crate::identity::AuthError;
use crate::proctoring::ProctoringError;
use crate::sampler::SamplerError;

/// Errors related to the session lifecycle
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),

    #[error("session already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("time limit reached")]
    DeadlinePassed,

    #[error("answer option out of range: {0}")]
    InvalidOption(u8),

    #[error("question is not part of this session: {0}")]
    UnknownQuestion(i64),

    #[error("session is locked by another operation: {0}")]
    Contention(Uuid),
}

/// Top-level error type for gauge-core
#[derive(Error, Debug)]
pub enum GaugeError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("proctoring error: {0}")]
    Proctoring(#[from] ProctoringError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("subject {subject} may not access session {session}")]
    AccessDenied { subject: String, session: Uuid },
}

/// Classification used by the boundary layer for status mapping and
/// messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent input
    Validation,
    /// Unknown session, topic, question or event
    NotFound,
    /// Operation invalid for the current lifecycle state, including
    /// post-deadline submission
    State,
    /// Topic pools cannot satisfy the quota
    InsufficientData,
    /// Per-session lock could not be acquired in time
    Concurrency,
    /// Propagated, unreinterpreted identity gateway failure
    UpstreamAuth,
    /// Caller is not allowed to touch this session
    AccessDenied,
}

impl SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::UnknownQuestion(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) | Self::InvalidOption(_) => ErrorKind::Validation,
            Self::InvalidState { .. } | Self::DeadlinePassed => ErrorKind::State,
            Self::Contention(_) => ErrorKind::Concurrency,
        }
    }
}

impl GaugeError {
    /// Map onto the error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => e.kind(),
            Self::Assembly(e) => match e {
                AssemblyError::SpecializationMismatch { .. } => ErrorKind::Validation,
                AssemblyError::NotAssembled(_) => ErrorKind::NotFound,
                AssemblyError::Catalog(c) => catalog_kind(c),
                AssemblyError::Sampler(_) => ErrorKind::InsufficientData,
                AssemblyError::Session(s) => s.kind(),
            },
            Self::Catalog(e) => catalog_kind(e),
            Self::Sampler(_) => ErrorKind::InsufficientData,
            Self::Proctoring(e) => match e {
                ProctoringError::EventNotFound(_) => ErrorKind::NotFound,
                ProctoringError::EmptyDetails => ErrorKind::Validation,
                ProctoringError::Session(s) => s.kind(),
            },
            Self::Auth(_) => ErrorKind::UpstreamAuth,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
        }
    }

    /// Message safe to show the assessed user.
    ///
    /// State and lock errors collapse into a generic "cannot continue";
    /// reviewers get the full classification via `Display` instead.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::State | ErrorKind::Concurrency => "The assessment cannot continue.",
            ErrorKind::Validation => "The request is invalid.",
            ErrorKind::NotFound => "Not found.",
            ErrorKind::InsufficientData => "The assessment cannot be prepared right now.",
            ErrorKind::UpstreamAuth => "Sign-in failed.",
            ErrorKind::AccessDenied => "Access denied.",
        }
    }
}

fn catalog_kind(error: &CatalogError) -> ErrorKind {
    match error {
        // A topic without its full tier set is corrupt content, not a miss
        CatalogError::MissingTier { .. } => ErrorKind::Validation,
        _ => ErrorKind::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_kinds() {
        assert_eq!(
            GaugeError::from(SessionError::NotFound(Uuid::nil())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            GaugeError::from(SessionError::DeadlinePassed).kind(),
            ErrorKind::State
        );
        assert_eq!(
            GaugeError::from(SessionError::Contention(Uuid::nil())).kind(),
            ErrorKind::Concurrency
        );
        assert_eq!(
            GaugeError::from(SessionError::InvalidOption(9)).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn sampler_error_maps_to_insufficient_data() {
        let error = GaugeError::from(SamplerError::InsufficientData {
            available: 5,
            required: 8,
        });
        assert_eq!(error.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn auth_error_propagates_unreinterpreted() {
        let error = GaugeError::from(AuthError::NotWhitelisted);
        assert_eq!(error.kind(), ErrorKind::UpstreamAuth);
        assert!(error.to_string().contains("not whitelisted"));
    }

    #[test]
    fn nested_assembly_errors_delegate() {
        let error = GaugeError::from(AssemblyError::Session(SessionError::Contention(
            Uuid::nil(),
        )));
        assert_eq!(error.kind(), ErrorKind::Concurrency);

        let error = GaugeError::from(AssemblyError::Catalog(CatalogError::MissingTier {
            topic_id: 1,
            tier: crate::catalog::Tier::Senior,
        }));
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn public_message_hides_state_detail() {
        let error = GaugeError::from(SessionError::DeadlinePassed);
        assert_eq!(error.public_message(), "The assessment cannot continue.");
        // Reviewer-facing Display keeps the detail
        assert!(error.to_string().contains("time limit reached"));
    }

    #[test]
    fn access_denied_kind_and_message() {
        let error = GaugeError::AccessDenied {
            subject: "u1".into(),
            session: Uuid::nil(),
        };
        assert_eq!(error.kind(), ErrorKind::AccessDenied);
        assert_eq!(error.public_message(), "Access denied.");
    }
}
