//! # Pod Authorization Core
//!
//! Pure primitives for the pod authorization registry: identities, records,
//! history events, and the grant/revoke state machine.
//!
//! This crate contains no I/O, no storage, no clock. It is pure computation
//! over authorization state.
//!
//! ## Key Types
//!
//! - [`Principal`] - The caller identity a record belongs to
//! - [`ResourceHash`] - The contract/document an authorization applies to
//! - [`AuthorizationRecord`] - Current state of one (principal, resource) key
//! - [`AuthorizationEvent`] - One immutable history entry
//! - [`AuthorizationUpdated`] - Notification emitted on every state change
//!
//! ## Transitions
//!
//! [`plan_grant`] and [`plan_revoke`] validate a request against the current
//! record and return a [`Transition`] to commit. See [`state`].

pub mod error;
pub mod record;
pub mod state;
pub mod types;

pub use error::{CoreError, TransitionError};
pub use record::{Action, AuthorizationEvent, AuthorizationRecord, AuthorizationUpdated};
pub use state::{plan_grant, plan_revoke, AuthorizationState, Transition};
pub use types::{AppId, Principal, ResourceHash, Timestamp};
