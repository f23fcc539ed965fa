//! Error types for the Registry.

use pod_authz_core::TransitionError;
use pod_authz_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested grant or revoke was rejected. Nothing was written.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Grant was rejected because its validity was not in the future.
    pub fn is_invalid_expiry(&self) -> bool {
        matches!(
            self,
            RegistryError::Transition(TransitionError::InvalidExpiry { .. })
        )
    }

    /// Revoke was rejected because no active grant existed.
    pub fn is_no_active_authorization(&self) -> bool {
        matches!(
            self,
            RegistryError::Transition(TransitionError::NoActiveAuthorization)
        )
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
