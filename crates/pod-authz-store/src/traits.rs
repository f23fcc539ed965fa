//! Store trait: the abstract interface for authorization persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (durable) and in-memory (for tests).

use async_trait::async_trait;
use pod_authz_core::{
    AuthorizationEvent, AuthorizationRecord, Principal, ResourceHash, Transition,
};

use crate::error::Result;

/// The Store trait: async interface for records and histories.
///
/// Two logical tables:
///
/// - `(principal, resource) -> AuthorizationRecord`, upserted in place
/// - `principal -> [AuthorizationEvent]`, append-only, insertion ordered
///
/// # Design Notes
///
/// - **Atomic commit**: [`Store::commit`] applies the record upsert and the
///   history append together or not at all.
/// - **No validation**: the store persists what it is given. Transition rules
///   live in `pod_authz_core::state`.
/// - **No deletes**: nothing in this interface removes a record or an event.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the record for a key, if one was ever created.
    async fn get_record(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
    ) -> Result<Option<AuthorizationRecord>>;

    /// List every record held by a principal, ordered by resource hash.
    async fn list_records(
        &self,
        principal: &Principal,
    ) -> Result<Vec<(ResourceHash, AuthorizationRecord)>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Upsert `record` for the key and append `event` to the principal's
    /// history, atomically.
    async fn commit(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
        record: &AuthorizationRecord,
        event: &AuthorizationEvent,
    ) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // History Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a principal's full history, oldest first.
    async fn get_history(&self, principal: &Principal) -> Result<Vec<AuthorizationEvent>>;

    /// Number of events in a principal's history.
    async fn history_len(&self, principal: &Principal) -> Result<u64>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Commit a planned transition for `principal`.
    fn commit_transition(
        &self,
        principal: &Principal,
        transition: &Transition,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn commit_transition(&self, principal: &Principal, transition: &Transition) -> Result<()> {
        self.commit(
            principal,
            &transition.event.contract_hash,
            &transition.record,
            &transition.event,
        )
        .await
    }
}
