//! The per-key authorization state machine.
//!
//! Transitions are planned here as pure functions over the current record.
//! A planned [`Transition`] carries everything the store must commit (the new
//! record and the history event); nothing is written until it is applied.
//!
//! ```text
//!   Unset ──grant──▶ Active ◀──grant── Revoked
//!                    │  ▲                 ▲
//!                    │  └─────grant       │
//!                    └──────revoke────────┘
//! ```
//!
//! Revoke from `Unset` or `Revoked` is rejected.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::record::{Action, AuthorizationEvent, AuthorizationRecord};
use crate::types::{AppId, ResourceHash, Timestamp};

/// Lifecycle state of a (principal, resource) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationState {
    /// No record has ever been created.
    Unset,
    /// A record exists with `granted == true`.
    Active,
    /// A record exists with `granted == false`.
    Revoked,
}

impl AuthorizationState {
    /// Classify a stored record (or its absence).
    pub fn of(record: Option<&AuthorizationRecord>) -> Self {
        match record {
            None => AuthorizationState::Unset,
            Some(r) if r.granted => AuthorizationState::Active,
            Some(_) => AuthorizationState::Revoked,
        }
    }
}

/// A validated transition, ready to be committed atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State before the transition.
    pub from: AuthorizationState,
    /// The record to upsert.
    pub record: AuthorizationRecord,
    /// The event to append to the principal's history.
    pub event: AuthorizationEvent,
}

/// Plan a grant for `resource`.
///
/// Valid from any state, provided `valid_until` is strictly after `now`.
/// Overwrites whatever the key held before.
pub fn plan_grant(
    current: Option<&AuthorizationRecord>,
    resource: &ResourceHash,
    app_id: AppId,
    valid_until: Timestamp,
    now: Timestamp,
) -> Result<Transition, TransitionError> {
    if valid_until <= now {
        return Err(TransitionError::InvalidExpiry { valid_until, now });
    }

    let event = AuthorizationEvent {
        action: Action::Grant,
        contract_hash: resource.clone(),
        app_id: app_id.clone(),
        valid_until,
        timestamp: now,
    };

    Ok(Transition {
        from: AuthorizationState::of(current),
        record: AuthorizationRecord::granted(app_id, valid_until),
        event,
    })
}

/// Plan a revoke for `resource`.
///
/// Only valid from `Active`. The record keeps its app id and validity; the
/// event snapshots them.
pub fn plan_revoke(
    current: Option<&AuthorizationRecord>,
    resource: &ResourceHash,
    now: Timestamp,
) -> Result<Transition, TransitionError> {
    let existing = match current {
        Some(r) if r.granted => r,
        _ => return Err(TransitionError::NoActiveAuthorization),
    };

    let record = AuthorizationRecord {
        granted: false,
        ..existing.clone()
    };

    let event = AuthorizationEvent {
        action: Action::Revoke,
        contract_hash: resource.clone(),
        app_id: existing.app_id.clone(),
        valid_until: existing.valid_until,
        timestamp: now,
    };

    Ok(Transition {
        from: AuthorizationState::Active,
        record,
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hash() -> ResourceHash {
        ResourceHash::from("hash_123")
    }

    #[test]
    fn test_grant_from_unset() {
        let t = plan_grant(None, &hash(), AppId::from("app_xyz"), 4600, 1000).unwrap();

        assert_eq!(t.from, AuthorizationState::Unset);
        assert_eq!(t.record, AuthorizationRecord::granted(AppId::from("app_xyz"), 4600));
        assert_eq!(t.event.action, Action::Grant);
        assert_eq!(t.event.contract_hash, hash());
        assert_eq!(t.event.valid_until, 4600);
        assert_eq!(t.event.timestamp, 1000);
    }

    #[test]
    fn test_grant_rejects_now_and_past() {
        let at_now = plan_grant(None, &hash(), AppId::from("a"), 1000, 1000);
        assert_eq!(
            at_now.unwrap_err(),
            TransitionError::InvalidExpiry { valid_until: 1000, now: 1000 }
        );

        let past = plan_grant(None, &hash(), AppId::from("a"), 900, 1000);
        assert!(matches!(past, Err(TransitionError::InvalidExpiry { .. })));
    }

    #[test]
    fn test_error_messages() {
        let expiry = TransitionError::InvalidExpiry { valid_until: 1, now: 2 };
        assert_eq!(expiry.to_string(), "Authorization must be in the future");
        assert_eq!(
            TransitionError::NoActiveAuthorization.to_string(),
            "No active authorization"
        );
    }

    #[test]
    fn test_regrant_overwrites() {
        let active = AuthorizationRecord::granted(AppId::from("old"), 5000);
        let t = plan_grant(Some(&active), &hash(), AppId::from("new"), 9000, 1000).unwrap();

        assert_eq!(t.from, AuthorizationState::Active);
        assert_eq!(t.record.app_id, AppId::from("new"));
        assert_eq!(t.record.valid_until, 9000);
    }

    #[test]
    fn test_grant_after_revoke() {
        let revoked = AuthorizationRecord {
            app_id: AppId::from("old"),
            valid_until: 5000,
            granted: false,
        };
        let t = plan_grant(Some(&revoked), &hash(), AppId::from("old"), 6000, 1000).unwrap();
        assert_eq!(t.from, AuthorizationState::Revoked);
        assert!(t.record.granted);
    }

    #[test]
    fn test_revoke_retains_snapshot() {
        let active = AuthorizationRecord::granted(AppId::from("app_xyz"), 4600);
        let t = plan_revoke(Some(&active), &hash(), 2000).unwrap();

        assert_eq!(t.from, AuthorizationState::Active);
        assert!(!t.record.granted);
        assert_eq!(t.record.app_id, AppId::from("app_xyz"));
        assert_eq!(t.record.valid_until, 4600);
        assert_eq!(t.event.action, Action::Revoke);
        assert_eq!(t.event.app_id, AppId::from("app_xyz"));
        assert_eq!(t.event.valid_until, 4600);
        assert_eq!(t.event.timestamp, 2000);
    }

    #[test]
    fn test_revoke_rejected_when_unset_or_revoked() {
        assert_eq!(
            plan_revoke(None, &hash(), 0).unwrap_err(),
            TransitionError::NoActiveAuthorization
        );

        let revoked = AuthorizationRecord {
            app_id: AppId::from("a"),
            valid_until: 10,
            granted: false,
        };
        assert_eq!(
            plan_revoke(Some(&revoked), &hash(), 0).unwrap_err(),
            TransitionError::NoActiveAuthorization
        );
    }

    #[test]
    fn test_revoke_of_lapsed_grant_is_allowed() {
        // Expiry is a grant-time rule only.
        let lapsed = AuthorizationRecord::granted(AppId::from("a"), 10);
        assert!(plan_revoke(Some(&lapsed), &hash(), 5000).is_ok());
    }

    proptest! {
        #[test]
        fn grant_succeeds_iff_future(valid_until in any::<u64>(), now in any::<u64>()) {
            let result = plan_grant(None, &hash(), AppId::from("app"), valid_until, now);
            prop_assert_eq!(result.is_ok(), valid_until > now);
        }

        #[test]
        fn revoke_succeeds_iff_active(granted in any::<bool>(), present in any::<bool>()) {
            let record = AuthorizationRecord {
                app_id: AppId::from("app"),
                valid_until: 100,
                granted,
            };
            let current = present.then_some(&record);
            let result = plan_revoke(current, &hash(), 50);
            prop_assert_eq!(result.is_ok(), present && granted);
        }
    }
}
