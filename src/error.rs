//! Error taxonomy for the scan engine.
//!
//! Collection failures are contained per platform: they degrade that
//! platform's entry to a placeholder record carrying an [`ErrorKind`],
//! never the whole scan. Only malformed input aborts before collection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of the scan entry point.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The raw identifier was empty or unusable; no collection is attempted.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A platform name could not be parsed.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}

/// Typed failure raised by a collector adapter for one platform.
#[derive(Debug, Clone, Error)]
pub enum CollectError {
    /// Network pressure, rate limiting, or another failure worth retrying.
    #[error("transient collection failure: {0}")]
    Transient(String),

    /// The platform refuses access; retrying will not help.
    #[error("permanent collection failure: {0}")]
    Permanent(String),

    /// The stored session is missing or invalid; callers should
    /// re-provision credentials before trying this platform again.
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// The adapter gave up waiting on the platform.
    #[error("collection timed out: {0}")]
    Timeout(String),
}

impl CollectError {
    /// Only transient failures are eligible for orchestrator retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CollectError::Transient(_))
    }

    /// The wire kind recorded on the placeholder profile.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectError::Transient(_) => ErrorKind::Transient,
            CollectError::Permanent(_) => ErrorKind::Permanent,
            CollectError::AuthRequired(_) => ErrorKind::AuthRequired,
            CollectError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// Failure kind recorded on a placeholder profile when a platform
/// could not be collected. Wire form of [`CollectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Permanent,
    AuthRequired,
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Permanent => write!(f, "permanent"),
            ErrorKind::AuthRequired => write!(f, "auth_required"),
            ErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(CollectError::Transient("rate limited".into()).is_retryable());
        assert!(!CollectError::Permanent("blocked".into()).is_retryable());
        assert!(!CollectError::AuthRequired("session expired".into()).is_retryable());
        assert!(!CollectError::Timeout("no response".into()).is_retryable());
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            CollectError::AuthRequired("x".into()).kind(),
            ErrorKind::AuthRequired
        );
        assert_eq!(CollectError::Timeout("x".into()).kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_error_kind_wire_names() {
        let json = serde_json::to_string(&ErrorKind::AuthRequired).unwrap();
        assert_eq!(json, "\"auth_required\"");
        let back: ErrorKind = serde_json::from_str("\"timeout\"").unwrap();
        assert_eq!(back, ErrorKind::Timeout);
    }
}
