//! # Pod Authorization Registry
//!
//! Principals grant or revoke time-bounded permission for a named application
//! to act under a contract/document hash. The registry answers "is this grant
//! active" queries and keeps an append-only history of every action.
//!
//! ## Overview
//!
//! - **Records**: one per (principal, resource), upserted in place, never deleted
//! - **History**: per-principal, append-only, oldest first
//! - **Notifications**: an [`AuthorizationUpdated`] per committed change
//!
//! ## State Machine
//!
//! Each key is `Unset`, `Active` or `Revoked`. Grant moves any state to
//! `Active` if its validity is in the future. Revoke moves `Active` to
//! `Revoked` and is rejected from anywhere else.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pod_authz::{Registry, RegistryConfig};
//! use pod_authz::core::{Principal, ResourceHash};
//! use pod_authz::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("authz.db").unwrap();
//!     let registry = Registry::new(store, RegistryConfig::default());
//!
//!     let caller = Principal::derive("alice");
//!     let contract = ResourceHash::from("hash_123");
//!     let mut updates = registry.subscribe();
//!
//!     registry
//!         .grant_authorization(&caller, &contract, "app_xyz", 4_102_444_800)
//!         .await
//!         .unwrap();
//!     assert!(registry.is_authorized(&caller, &contract).await.unwrap());
//!
//!     let update = updates.recv().await.unwrap();
//!     println!("{} {}", update.action, update.resource_hash);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `pod_authz::core` - Identities, records, events, transitions
//! - `pod_authz::store` - Storage abstraction and SQLite

pub mod clock;
pub mod error;
pub mod notify;
pub mod registry;

// Re-export component crates
pub use pod_authz_core as core;
pub use pod_authz_store as store;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RegistryError, Result};
pub use notify::Notifier;
pub use registry::{Registry, RegistryConfig};

// Re-export commonly used core types
pub use pod_authz_core::{
    Action, AppId, AuthorizationEvent, AuthorizationRecord, AuthorizationState,
    AuthorizationUpdated, Principal, ResourceHash, Timestamp, TransitionError,
};
