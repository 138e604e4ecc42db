//! Identity gateway error types

use thiserror::Error;

/// Classified verification failures
///
/// These propagate to callers unreinterpreted; the core never rewrites an
/// upstream auth failure into one of its own error classes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Subject is not on the allow-list; the directory is never consulted
    #[error("subject is not whitelisted")]
    NotWhitelisted,

    /// Directory rejected the credentials
    #[error("the username or password is incorrect")]
    InvalidCredentials,

    /// Directory could not be reached
    #[error("identity provider unavailable: {0}")]
    UpstreamUnavailable(String),
}
