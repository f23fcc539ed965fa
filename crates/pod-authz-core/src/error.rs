//! Error types for the authorization core.

use thiserror::Error;

use crate::types::Timestamp;

/// Errors from decoding core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Rejected state transitions.
///
/// Both are raised before any write, so a rejected call leaves no trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Grant requested with a validity that is not in the future.
    #[error("Authorization must be in the future")]
    InvalidExpiry { valid_until: Timestamp, now: Timestamp },

    /// Revoke requested with no currently active grant for the key.
    #[error("No active authorization")]
    NoActiveAuthorization,
}
