//! Proptest generators and a reference model for property-based testing.
//!
//! [`Op`] sequences drive a real registry and a [`Model`] side by side; the
//! model is a plain map that encodes the grant/revoke rules directly, so any
//! divergence points at the registry or its store.

use std::collections::HashMap;

use proptest::prelude::*;

use pod_authz_core::{
    Action, AppId, AuthorizationEvent, AuthorizationRecord, Principal, ResourceHash, Timestamp,
};

/// Pick one of a few fixed principals, so sequences revisit the same keys.
pub fn small_principal() -> impl Strategy<Value = Principal> {
    (0u8..3).prop_map(|i| Principal::derive(&format!("p{}", i)))
}

/// Pick one of a few fixed resource hashes.
pub fn small_resource() -> impl Strategy<Value = ResourceHash> {
    (0u8..3).prop_map(|i| ResourceHash::new(format!("hash_{}", i)))
}

/// Generate an application id.
pub fn app_id() -> impl Strategy<Value = AppId> {
    "app_[a-z0-9]{1,8}".prop_map(AppId::from)
}

/// The validity a generated grant asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// `now + offset`, so `offset <= 0` must fail.
    Offset(i64),
    /// An absolute timestamp.
    At(Timestamp),
}

impl Expiry {
    pub fn resolve(self, now: Timestamp) -> Timestamp {
        match self {
            Expiry::Offset(offset) => valid_until_for(now, offset),
            Expiry::At(at) => at,
        }
    }
}

/// Mostly near-term validity, sometimes at the top of the timestamp range.
pub fn expiry() -> impl Strategy<Value = Expiry> {
    prop_oneof![
        8 => (-100i64..=7200).prop_map(Expiry::Offset),
        1 => prop_oneof![
            Just(i64::MAX as u64),
            Just(i64::MAX as u64 + 1),
            Just(u64::MAX),
            (i64::MAX as u64)..=u64::MAX,
        ]
        .prop_map(Expiry::At),
    ]
}

/// One registry operation.
#[derive(Debug, Clone)]
pub enum Op {
    Grant {
        caller: Principal,
        resource: ResourceHash,
        app_id: AppId,
        expiry: Expiry,
    },
    Revoke {
        caller: Principal,
        resource: ResourceHash,
    },
    /// Move the clock forward.
    Advance(u64),
}

/// Generate a single operation over a small key space.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (small_principal(), small_resource(), app_id(), expiry())
            .prop_map(|(caller, resource, app_id, expiry)| Op::Grant {
                caller,
                resource,
                app_id,
                expiry,
            }),
        3 => (small_principal(), small_resource())
            .prop_map(|(caller, resource)| Op::Revoke { caller, resource }),
        1 => (0u64..=7200).prop_map(Op::Advance),
    ]
}

/// Generate an operation sequence of up to `max_len` steps.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..=max_len)
}

/// Resolve a grant offset against `now`, saturating at the timestamp range.
pub fn valid_until_for(now: Timestamp, offset: i64) -> Timestamp {
    if offset >= 0 {
        now.saturating_add(offset as u64)
    } else {
        now.saturating_sub(offset.unsigned_abs())
    }
}

/// Reference model of the registry's observable state.
#[derive(Debug, Default, Clone)]
pub struct Model {
    pub records: HashMap<(Principal, ResourceHash), AuthorizationRecord>,
    pub histories: HashMap<Principal, Vec<AuthorizationEvent>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a grant. Returns whether it should succeed.
    pub fn grant(
        &mut self,
        caller: Principal,
        resource: &ResourceHash,
        app_id: &AppId,
        valid_until: Timestamp,
        now: Timestamp,
    ) -> bool {
        if valid_until <= now {
            return false;
        }
        self.records.insert(
            (caller, resource.clone()),
            AuthorizationRecord::granted(app_id.clone(), valid_until),
        );
        self.histories.entry(caller).or_default().push(AuthorizationEvent {
            action: Action::Grant,
            contract_hash: resource.clone(),
            app_id: app_id.clone(),
            valid_until,
            timestamp: now,
        });
        true
    }

    /// Apply a revoke. Returns whether it should succeed.
    pub fn revoke(&mut self, caller: Principal, resource: &ResourceHash, now: Timestamp) -> bool {
        let Some(record) = self.records.get_mut(&(caller, resource.clone())) else {
            return false;
        };
        if !record.granted {
            return false;
        }
        record.granted = false;
        let event = AuthorizationEvent {
            action: Action::Revoke,
            contract_hash: resource.clone(),
            app_id: record.app_id.clone(),
            valid_until: record.valid_until,
            timestamp: now,
        };
        self.histories.entry(caller).or_default().push(event);
        true
    }

    pub fn details(&self, principal: Principal, resource: &ResourceHash) -> AuthorizationRecord {
        self.records
            .get(&(principal, resource.clone()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn history(&self, principal: Principal) -> Vec<AuthorizationEvent> {
        self.histories.get(&principal).cloned().unwrap_or_default()
    }
}
