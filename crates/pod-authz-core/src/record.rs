//! Authorization records, history events, and change notifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{AppId, Principal, ResourceHash, Timestamp};

/// The action tag carried by history events and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Grant,
    Revoke,
}

impl Action {
    /// The wire string: `"grant"` or `"revoke"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Grant => "grant",
            Action::Revoke => "revoke",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grant" => Ok(Action::Grant),
            "revoke" => Ok(Action::Revoke),
            other => Err(CoreError::UnknownAction(other.to_string())),
        }
    }
}

/// Authorization state for one (principal, resource) key.
///
/// The default value is what a never-granted key reports: empty app id,
/// zero validity, not granted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Application acting under the grant.
    pub app_id: AppId,

    /// Grant is meant to lapse after this time.
    pub valid_until: Timestamp,

    /// True while an active grant exists.
    pub granted: bool,
}

impl AuthorizationRecord {
    /// A freshly granted record.
    pub fn granted(app_id: AppId, valid_until: Timestamp) -> Self {
        Self {
            app_id,
            valid_until,
            granted: true,
        }
    }

    /// Whether `valid_until` has passed at `now`.
    ///
    /// Informational only: the registry does not consult this on reads
    /// unless configured to.
    pub fn is_lapsed(&self, now: Timestamp) -> bool {
        self.valid_until <= now
    }
}

/// One immutable entry of a principal's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationEvent {
    pub action: Action,

    /// The resource the action applied to.
    pub contract_hash: ResourceHash,

    /// Snapshot of the record's app id at the time of the action.
    pub app_id: AppId,

    /// Snapshot of the record's validity at the time of the action.
    pub valid_until: Timestamp,

    /// When the action occurred.
    pub timestamp: Timestamp,
}

/// Notification emitted after every committed grant or revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationUpdated {
    pub principal: Principal,
    pub resource_hash: ResourceHash,
    pub action: Action,
    pub app_id: AppId,
    pub valid_until: Timestamp,
}

impl AuthorizationUpdated {
    /// Build the notification for an event committed on behalf of `principal`.
    pub fn from_event(principal: Principal, event: &AuthorizationEvent) -> Self {
        Self {
            principal,
            resource_hash: event.contract_hash.clone(),
            action: event.action,
            app_id: event.app_id.clone(),
            valid_until: event.valid_until,
        }
    }
}
