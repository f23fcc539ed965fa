//! # Pod Authorization Testkit
//!
//! Testing utilities for the pod authorization registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden scenarios**: Scripted call sequences with expected outcomes, replayed on every backend
//! - **Generators**: Proptest strategies and a reference model for property-based testing
//! - **Fixtures**: A registry on a manual clock, plus principal helpers
//!
//! ## Golden Scenarios
//!
//! ```rust,no_run
//! use pod_authz_testkit::{all_scenarios, run_scenario, TestFixture};
//!
//! async fn example() {
//!     for scenario in all_scenarios() {
//!         let fixture = TestFixture::new();
//!         let history = run_scenario(&fixture, &scenario).await;
//!         println!("{}: {} events", scenario.name, history.len());
//!     }
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pod_authz_testkit::generators::{ops, Model};
//!
//! proptest! {
//!     #[test]
//!     fn registry_matches_model(ops in ops(32)) {
//!         // drive a registry and a Model with the same ops, compare state
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod scenarios;

pub use fixtures::{
    contract, multi_party_principals, principal, random_principal, TestFixture, FIXTURE_NOW, HOUR,
};
pub use generators::{Expiry, Model, Op};
pub use scenarios::{all_scenarios, history_json, run_scenario, Outcome, Scenario, Step};
