//! Golden scenarios: scripted call sequences with their expected outcomes.
//!
//! Every store backend must replay these identically. Each step names the
//! call, its arguments relative to the fixture clock, and whether it should
//! succeed; the final expected history is recorded as JSON so it can be
//! compared byte-for-byte across backends.

use pod_authz::RegistryError;
use pod_authz_core::{AuthorizationEvent, Principal, ResourceHash};
use pod_authz_store::Store;

use crate::fixtures::{TestFixture, HOUR};

/// Expected outcome of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    InvalidExpiry,
    NoActiveAuthorization,
}

impl Outcome {
    fn of(result: &Result<(), RegistryError>) -> Option<Self> {
        match result {
            Ok(()) => Some(Outcome::Ok),
            Err(e) if e.is_invalid_expiry() => Some(Outcome::InvalidExpiry),
            Err(e) if e.is_no_active_authorization() => Some(Outcome::NoActiveAuthorization),
            Err(_) => None,
        }
    }
}

/// One scripted call.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Grant `app` on `hash`, valid until `now + offset`.
    Grant {
        hash: &'static str,
        app: &'static str,
        offset: i64,
        expect: Outcome,
    },
    Revoke {
        hash: &'static str,
        expect: Outcome,
    },
    /// Advance the clock.
    Advance(u64),
}

/// A named scenario for a single caller.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub caller: &'static str,
    pub steps: Vec<Step>,
    /// `(hash, authorized)` after the last step.
    pub final_authorized: Vec<(&'static str, bool)>,
    /// Expected history actions, oldest first.
    pub expected_actions: Vec<&'static str>,
}

/// Get all golden scenarios.
pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "grant then revoke",
            caller: "user",
            steps: vec![
                Step::Grant { hash: "h1", app: "app1", offset: HOUR as i64, expect: Outcome::Ok },
                Step::Revoke { hash: "h1", expect: Outcome::Ok },
            ],
            final_authorized: vec![("h1", false)],
            expected_actions: vec!["grant", "revoke"],
        },
        Scenario {
            name: "expired and present-time grants are rejected",
            caller: "user",
            steps: vec![
                Step::Grant { hash: "hash_123", app: "app_xyz", offset: -100, expect: Outcome::InvalidExpiry },
                Step::Grant { hash: "hash_123", app: "app_xyz", offset: 0, expect: Outcome::InvalidExpiry },
            ],
            final_authorized: vec![("hash_123", false)],
            expected_actions: vec![],
        },
        Scenario {
            name: "revoke without grant and double revoke",
            caller: "user",
            steps: vec![
                Step::Revoke { hash: "hash_123", expect: Outcome::NoActiveAuthorization },
                Step::Grant { hash: "hash_123", app: "app_xyz", offset: 10, expect: Outcome::Ok },
                Step::Revoke { hash: "hash_123", expect: Outcome::Ok },
                Step::Revoke { hash: "hash_123", expect: Outcome::NoActiveAuthorization },
            ],
            final_authorized: vec![("hash_123", false)],
            expected_actions: vec!["grant", "revoke"],
        },
        Scenario {
            name: "re-grant after revoke",
            caller: "user",
            steps: vec![
                Step::Grant { hash: "h1", app: "app1", offset: HOUR as i64, expect: Outcome::Ok },
                Step::Revoke { hash: "h1", expect: Outcome::Ok },
                Step::Advance(60),
                Step::Grant { hash: "h1", app: "app2", offset: HOUR as i64, expect: Outcome::Ok },
            ],
            final_authorized: vec![("h1", true)],
            expected_actions: vec!["grant", "revoke", "grant"],
        },
        Scenario {
            name: "lapsed grant stays authorized and revocable",
            caller: "user",
            steps: vec![
                Step::Grant { hash: "h1", app: "app1", offset: 5, expect: Outcome::Ok },
                Step::Grant { hash: "h2", app: "app1", offset: 5, expect: Outcome::Ok },
                Step::Advance(HOUR),
                Step::Revoke { hash: "h2", expect: Outcome::Ok },
            ],
            final_authorized: vec![("h1", true), ("h2", false)],
            expected_actions: vec!["grant", "grant", "revoke"],
        },
    ]
}

/// Replay `scenario` against the fixture, panicking on the first mismatch.
///
/// Returns the caller's final history.
pub async fn run_scenario<S: Store>(
    fixture: &TestFixture<S>,
    scenario: &Scenario,
) -> Vec<AuthorizationEvent> {
    let caller = Principal::derive(scenario.caller);
    let registry = &fixture.registry;

    for (i, step) in scenario.steps.iter().enumerate() {
        let (result, expect) = match *step {
            Step::Grant { hash, app, offset, expect } => {
                let valid_until = crate::generators::valid_until_for(fixture.now(), offset);
                let result = registry
                    .grant_authorization(&caller, &ResourceHash::from(hash), app, valid_until)
                    .await;
                (result, expect)
            }
            Step::Revoke { hash, expect } => {
                let result = registry
                    .revoke_authorization(&caller, &ResourceHash::from(hash))
                    .await;
                (result, expect)
            }
            Step::Advance(secs) => {
                fixture.clock.advance(secs);
                continue;
            }
        };

        assert_eq!(
            Outcome::of(&result),
            Some(expect),
            "scenario '{}' step {}: got {:?}",
            scenario.name,
            i,
            result
        );
    }

    for (hash, authorized) in &scenario.final_authorized {
        let actual = registry
            .is_authorized(&caller, &ResourceHash::from(*hash))
            .await
            .expect("is_authorized");
        assert_eq!(
            actual, *authorized,
            "scenario '{}': authorization of {}",
            scenario.name, hash
        );
    }

    let history = registry
        .get_user_history(&caller)
        .await
        .expect("get_user_history");
    let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions, scenario.expected_actions,
        "scenario '{}': history actions",
        scenario.name
    );

    history
}

/// Render a history as JSON for cross-backend comparison.
pub fn history_json(history: &[AuthorizationEvent]) -> serde_json::Value {
    serde_json::to_value(history).unwrap_or(serde_json::Value::Null)
}
