//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use pod_authz_core::{AuthorizationEvent, AuthorizationRecord, Principal, ResourceHash};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; a
/// commit happens under one write guard, so readers never observe a record
/// without its history entry.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records per principal, keyed by resource (ordered for listing).
    records: HashMap<Principal, BTreeMap<ResourceHash, AuthorizationRecord>>,

    /// Append-only history per principal.
    histories: HashMap<Principal, Vec<AuthorizationEvent>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_record(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
    ) -> Result<Option<AuthorizationRecord>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .get(principal)
            .and_then(|by_resource| by_resource.get(resource))
            .cloned())
    }

    async fn list_records(
        &self,
        principal: &Principal,
    ) -> Result<Vec<(ResourceHash, AuthorizationRecord)>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .get(principal)
            .map(|by_resource| {
                by_resource
                    .iter()
                    .map(|(hash, record)| (hash.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
        record: &AuthorizationRecord,
        event: &AuthorizationEvent,
    ) -> Result<()> {
        let mut inner = self.write()?;

        inner
            .records
            .entry(*principal)
            .or_default()
            .insert(resource.clone(), record.clone());

        inner
            .histories
            .entry(*principal)
            .or_default()
            .push(event.clone());

        Ok(())
    }

    async fn get_history(&self, principal: &Principal) -> Result<Vec<AuthorizationEvent>> {
        let inner = self.read()?;
        Ok(inner.histories.get(principal).cloned().unwrap_or_default())
    }

    async fn history_len(&self, principal: &Principal) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner
            .histories
            .get(principal)
            .map_or(0, |events| events.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_authz_core::{Action, AppId};

    fn grant_event(hash: &str, valid_until: u64, at: u64) -> AuthorizationEvent {
        AuthorizationEvent {
            action: Action::Grant,
            contract_hash: ResourceHash::from(hash),
            app_id: AppId::from("app_xyz"),
            valid_until,
            timestamp: at,
        }
    }

    #[tokio::test]
    async fn test_memory_store_commit_and_read() {
        let store = MemoryStore::new();
        let alice = Principal::derive("alice");
        let hash = ResourceHash::from("hash_123");
        let record = AuthorizationRecord::granted(AppId::from("app_xyz"), 4600);

        store
            .commit(&alice, &hash, &record, &grant_event("hash_123", 4600, 1000))
            .await
            .unwrap();

        assert_eq!(store.get_record(&alice, &hash).await.unwrap(), Some(record));
        assert_eq!(store.history_len(&alice).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_unknown_keys() {
        let store = MemoryStore::new();
        let bob = Principal::derive("bob");

        assert!(store
            .get_record(&bob, &ResourceHash::from("nope"))
            .await
            .unwrap()
            .is_none());
        assert!(store.get_history(&bob).await.unwrap().is_empty());
        assert!(store.list_records(&bob).await.unwrap().is_empty());
        assert_eq!(store.history_len(&bob).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_store_upsert_keeps_history() {
        let store = MemoryStore::new();
        let alice = Principal::derive("alice");
        let hash = ResourceHash::from("h1");

        let first = AuthorizationRecord::granted(AppId::from("app_xyz"), 100);
        let second = AuthorizationRecord::granted(AppId::from("app_xyz"), 200);
        store
            .commit(&alice, &hash, &first, &grant_event("h1", 100, 1))
            .await
            .unwrap();
        store
            .commit(&alice, &hash, &second, &grant_event("h1", 200, 2))
            .await
            .unwrap();

        assert_eq!(store.get_record(&alice, &hash).await.unwrap(), Some(second));
        let history = store.get_history(&alice).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].valid_until, 100);
        assert_eq!(history[1].valid_until, 200);
    }

    #[tokio::test]
    async fn test_memory_store_list_is_ordered_and_scoped() {
        let store = MemoryStore::new();
        let alice = Principal::derive("alice");
        let bob = Principal::derive("bob");
        let record = AuthorizationRecord::granted(AppId::from("app_xyz"), 100);

        for hash in ["h2", "h1", "h3"] {
            store
                .commit(&alice, &ResourceHash::from(hash), &record, &grant_event(hash, 100, 1))
                .await
                .unwrap();
        }
        store
            .commit(&bob, &ResourceHash::from("h9"), &record, &grant_event("h9", 100, 1))
            .await
            .unwrap();

        let hashes: Vec<String> = store
            .list_records(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|(h, _)| h.to_string())
            .collect();
        assert_eq!(hashes, vec!["h1", "h2", "h3"]);
    }
}
