//! Guard errors.

use thiserror::Error;

/// Errors raised by the page guard.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The allow-list contains something that is not an e-mail address
    #[error("invalid e-mail in allow-list: {0}")]
    InvalidEmail(String),

    /// The identity provider failed to end the session
    #[error("sign-out failed: {0}")]
    SignOutFailed(String),

    /// Guard settings are inconsistent
    #[error("invalid guard settings: {0}")]
    InvalidSettings(String),
}

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, AuthError>;
