//! The Registry: grant, revoke, and query authorizations.
//!
//! The Registry brings together storage, the transition rules from
//! `pod_authz_core::state`, a clock, and notification fan-out.

use tokio::sync::{broadcast, Mutex};

use pod_authz_core::{
    plan_grant, plan_revoke, AppId, AuthorizationEvent, AuthorizationRecord, AuthorizationState,
    AuthorizationUpdated, Principal, ResourceHash, Timestamp, Transition,
};
use pod_authz_store::{Store, StoreExt};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::notify::Notifier;

/// Configuration for the Registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Updates buffered per notification subscriber before it lags.
    pub notification_capacity: usize,
    /// Also require `valid_until > now` in [`Registry::is_authorized`].
    ///
    /// Off by default: expiry is enforced when granting, and a lapsed grant
    /// keeps reporting authorized until it is revoked or re-granted.
    pub expire_on_read: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            notification_capacity: 256,
            expire_on_read: false,
        }
    }
}

/// The authorization registry.
///
/// Provides a unified API for:
/// - Granting and revoking authorizations on behalf of a caller
/// - Querying current authorization state
/// - Reading a principal's audit history
/// - Observing changes
///
/// # Concurrency
///
/// Grants and revokes are serialized by an internal write lock held across
/// read, validate, commit and publish. Reads take no lock beyond the
/// store's own and may run concurrently with a write; they see either the
/// state before a commit or after it, never in between.
pub struct Registry<S: Store, C: Clock = SystemClock> {
    /// The storage backend.
    store: S,
    /// Source of "now" for each operation.
    clock: C,
    /// Configuration.
    config: RegistryConfig,
    /// Serializes state transitions.
    write_lock: Mutex<()>,
    /// Outbound change notifications.
    notifier: Notifier,
}

impl<S: Store> Registry<S, SystemClock> {
    /// Create a registry on the system clock.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: Store, C: Clock> Registry<S, C> {
    /// Create a registry with an explicit clock.
    pub fn with_clock(store: S, clock: C, config: RegistryConfig) -> Self {
        let notifier = Notifier::new(config.notification_capacity);
        Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
            notifier,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register an observer for [`AuthorizationUpdated`] notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthorizationUpdated> {
        self.notifier.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `app_id` authorization on `resource` for `caller` until
    /// `valid_until`.
    ///
    /// Fails with `InvalidExpiry` unless `valid_until` is strictly after now.
    /// Overwrites any existing record for the key, active or revoked.
    pub async fn grant_authorization(
        &self,
        caller: &Principal,
        resource: &ResourceHash,
        app_id: impl Into<AppId>,
        valid_until: Timestamp,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let current = self.store.get_record(caller, resource).await?;
        let transition = plan_grant(current.as_ref(), resource, app_id.into(), valid_until, now)
            .map_err(|e| {
                tracing::debug!(
                    principal = %caller,
                    resource = %resource,
                    valid_until,
                    now,
                    "grant rejected: {}", e
                );
                e
            })?;

        self.apply(caller, transition).await
    }

    /// Revoke the caller's active authorization on `resource`.
    ///
    /// Fails with `NoActiveAuthorization` if the key was never granted or is
    /// already revoked. The record keeps its app id and validity.
    pub async fn revoke_authorization(
        &self,
        caller: &Principal,
        resource: &ResourceHash,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let current = self.store.get_record(caller, resource).await?;
        let transition = plan_revoke(current.as_ref(), resource, now).map_err(|e| {
            tracing::debug!(
                principal = %caller,
                resource = %resource,
                "revoke rejected: {}", e
            );
            e
        })?;

        self.apply(caller, transition).await
    }

    /// Commit a validated transition, then publish it.
    ///
    /// Must be called with the write lock held.
    async fn apply(&self, caller: &Principal, transition: Transition) -> Result<()> {
        let event = &transition.event;

        if let Err(e) = self.store.commit_transition(caller, &transition).await {
            tracing::warn!(
                principal = %caller,
                resource = %event.contract_hash,
                action = %event.action,
                "failed to commit authorization change: {}", e
            );
            return Err(e.into());
        }

        tracing::info!(
            principal = %caller,
            resource = %event.contract_hash,
            action = %event.action,
            app_id = %event.app_id,
            valid_until = event.valid_until,
            from = ?transition.from,
            "authorization updated"
        );

        self.notifier
            .publish(AuthorizationUpdated::from_event(*caller, event));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `principal` currently holds an active grant on `resource`.
    pub async fn is_authorized(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
    ) -> Result<bool> {
        let record = self.store.get_record(principal, resource).await?;

        Ok(match record {
            Some(r) if r.granted => !self.config.expire_on_read || !r.is_lapsed(self.clock.now()),
            _ => false,
        })
    }

    /// The stored record for a key, or the default record if none exists.
    pub async fn get_authorization_details(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
    ) -> Result<AuthorizationRecord> {
        Ok(self
            .store
            .get_record(principal, resource)
            .await?
            .unwrap_or_default())
    }

    /// The principal's full history, oldest first.
    pub async fn get_user_history(&self, principal: &Principal) -> Result<Vec<AuthorizationEvent>> {
        Ok(self.store.get_history(principal).await?)
    }

    /// Lifecycle state of a key.
    pub async fn authorization_state(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
    ) -> Result<AuthorizationState> {
        let record = self.store.get_record(principal, resource).await?;
        Ok(AuthorizationState::of(record.as_ref()))
    }

    /// Number of entries in the principal's history.
    pub async fn history_len(&self, principal: &Principal) -> Result<u64> {
        Ok(self.store.history_len(principal).await?)
    }

    /// Every record the principal holds, active and revoked, by resource.
    pub async fn list_authorizations(
        &self,
        principal: &Principal,
    ) -> Result<Vec<(ResourceHash, AuthorizationRecord)>> {
        Ok(self.store.list_records(principal).await?)
    }
}
