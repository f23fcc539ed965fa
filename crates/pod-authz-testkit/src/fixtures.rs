//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use pod_authz::{ManualClock, Registry, RegistryConfig};
use pod_authz_core::{Principal, ResourceHash, Timestamp};
use pod_authz_store::{MemoryStore, SqliteStore, Store, StoreError};

/// Default fixture time: 2023-11-14T22:13:20Z.
pub const FIXTURE_NOW: Timestamp = 1_700_000_000;

/// One hour, the validity window most tests grant for.
pub const HOUR: u64 = 3600;

/// A registry on a manual clock, with the clock handle kept for the test.
pub struct TestFixture<S: Store = MemoryStore> {
    pub clock: Arc<ManualClock>,
    pub registry: Registry<S, Arc<ManualClock>>,
}

impl TestFixture<MemoryStore> {
    /// In-memory registry at [`FIXTURE_NOW`].
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), RegistryConfig::default())
    }
}

impl TestFixture<SqliteStore> {
    /// SQLite (in-memory database) registry at [`FIXTURE_NOW`].
    pub fn sqlite() -> Result<Self, StoreError> {
        Ok(Self::with_store(
            SqliteStore::open_memory()?,
            RegistryConfig::default(),
        ))
    }
}

impl<S: Store> TestFixture<S> {
    /// Registry over an arbitrary store and config, at [`FIXTURE_NOW`].
    pub fn with_store(store: S, config: RegistryConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_NOW));
        let registry = Registry::with_clock(store, Arc::clone(&clock), config);
        Self { clock, registry }
    }

    /// Current fixture time.
    pub fn now(&self) -> Timestamp {
        pod_authz::Clock::now(&self.clock)
    }

    /// A timestamp `secs` after the current fixture time.
    pub fn in_future(&self, secs: u64) -> Timestamp {
        self.now() + secs
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// A principal derived from a readable name.
pub fn principal(name: &str) -> Principal {
    Principal::derive(name)
}

/// A fresh random principal.
pub fn random_principal() -> Principal {
    Principal::from_bytes(rand::random())
}

/// A resource hash for a readable contract name.
pub fn contract(name: &str) -> ResourceHash {
    ResourceHash::from(name)
}

/// Distinct principals for multi-party tests.
pub fn multi_party_principals(count: usize) -> Vec<Principal> {
    (0..count)
        .map(|i| principal(&format!("party-{}", i)))
        .collect()
}
