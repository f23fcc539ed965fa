//! SQLite implementation of the Store trait.
//!
//! This is the durable storage backend for the registry. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use pod_authz_core::{
    Action, AppId, AuthorizationEvent, AuthorizationRecord, Principal, ResourceHash, Timestamp,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::TaskJoin(e.to_string()))?
    }
}

// SQLite integers are signed. Timestamps are stored by bit pattern so the
// full u64 range survives; no query compares or orders on them.
fn to_sql_time(value: Timestamp) -> i64 {
    value as i64
}

fn from_sql_time(row: &rusqlite::Row<'_>, column: &str) -> rusqlite::Result<Timestamp> {
    Ok(row.get::<_, i64>(column)? as u64)
}

// Helper to convert a row to AuthorizationRecord
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuthorizationRecord> {
    Ok(AuthorizationRecord {
        app_id: AppId::new(row.get::<_, String>("app_id")?),
        valid_until: from_sql_time(row, "valid_until")?,
        granted: row.get::<_, i64>("granted")? != 0,
    })
}

// Helper to convert a row to AuthorizationEvent
fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuthorizationEvent> {
    let action: String = row.get("action")?;
    let action = action.parse::<Action>().map_err(|e| {
        let index = row.as_ref().column_index("action").unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
    })?;

    Ok(AuthorizationEvent {
        action,
        contract_hash: ResourceHash::new(row.get::<_, String>("contract_hash")?),
        app_id: AppId::new(row.get::<_, String>("app_id")?),
        valid_until: from_sql_time(row, "valid_until")?,
        timestamp: from_sql_time(row, "timestamp")?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_record(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
    ) -> Result<Option<AuthorizationRecord>> {
        let principal = *principal;
        let resource = resource.clone();

        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT app_id, valid_until, granted FROM authorizations
                 WHERE principal = ?1 AND resource_hash = ?2",
                params![principal.as_bytes().as_slice(), resource.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_records(
        &self,
        principal: &Principal,
    ) -> Result<Vec<(ResourceHash, AuthorizationRecord)>> {
        let principal = *principal;

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT resource_hash, app_id, valid_until, granted FROM authorizations
                 WHERE principal = ?1 ORDER BY resource_hash",
            )?;

            let records = stmt
                .query_map(params![principal.as_bytes().as_slice()], |row| {
                    let hash = ResourceHash::new(row.get::<_, String>("resource_hash")?);
                    Ok((hash, row_to_record(row)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(records)
        })
        .await
    }

    async fn commit(
        &self,
        principal: &Principal,
        resource: &ResourceHash,
        record: &AuthorizationRecord,
        event: &AuthorizationEvent,
    ) -> Result<()> {
        let principal = *principal;
        let resource = resource.clone();
        let record = record.clone();
        let event = event.clone();

        self.with_conn(move |conn| {
            let valid_until = to_sql_time(record.valid_until);
            let event_valid_until = to_sql_time(event.valid_until);
            let at = to_sql_time(event.timestamp);

            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO authorizations (
                    principal, resource_hash, app_id, valid_until, granted, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(principal, resource_hash) DO UPDATE SET
                    app_id = excluded.app_id,
                    valid_until = excluded.valid_until,
                    granted = excluded.granted,
                    updated_at = excluded.updated_at",
                params![
                    principal.as_bytes().as_slice(),
                    resource.as_str(),
                    record.app_id.as_str(),
                    valid_until,
                    record.granted as i64,
                    at,
                ],
            )?;

            tx.execute(
                "INSERT INTO authorization_history (
                    principal, action, contract_hash, app_id, valid_until, timestamp
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    principal.as_bytes().as_slice(),
                    event.action.as_str(),
                    event.contract_hash.as_str(),
                    event.app_id.as_str(),
                    event_valid_until,
                    at,
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_history(&self, principal: &Principal) -> Result<Vec<AuthorizationEvent>> {
        let principal = *principal;

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT action, contract_hash, app_id, valid_until, timestamp
                 FROM authorization_history WHERE principal = ?1 ORDER BY seq",
            )?;

            let events = stmt
                .query_map(params![principal.as_bytes().as_slice()], row_to_event)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(events)
        })
        .await
    }

    async fn history_len(&self, principal: &Principal) -> Result<u64> {
        let principal = *principal;

        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM authorization_history WHERE principal = ?1",
                params![principal.as_bytes().as_slice()],
                |row| row.get(0),
            )?;

            u64::try_from(count)
                .map_err(|_| StoreError::InvalidData(format!("negative row count {}", count)))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action: Action, hash: &str, valid_until: u64, at: u64) -> AuthorizationEvent {
        AuthorizationEvent {
            action,
            contract_hash: ResourceHash::from(hash),
            app_id: AppId::from("app_xyz"),
            valid_until,
            timestamp: at,
        }
    }

    #[tokio::test]
    async fn test_sqlite_commit_and_read() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = Principal::derive("alice");
        let hash = ResourceHash::from("hash_123");
        let record = AuthorizationRecord::granted(AppId::from("app_xyz"), 4600);

        store
            .commit(&alice, &hash, &record, &event(Action::Grant, "hash_123", 4600, 1000))
            .await
            .unwrap();

        assert_eq!(store.get_record(&alice, &hash).await.unwrap(), Some(record));

        let history = store.get_history(&alice).await.unwrap();
        assert_eq!(history, vec![event(Action::Grant, "hash_123", 4600, 1000)]);
    }

    #[tokio::test]
    async fn test_sqlite_history_preserves_order() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = Principal::derive("alice");
        let hash = ResourceHash::from("h1");
        let granted = AuthorizationRecord::granted(AppId::from("app_xyz"), 500);
        let revoked = AuthorizationRecord {
            granted: false,
            ..granted.clone()
        };

        store
            .commit(&alice, &hash, &granted, &event(Action::Grant, "h1", 500, 10))
            .await
            .unwrap();
        store
            .commit(&alice, &hash, &revoked, &event(Action::Revoke, "h1", 500, 20))
            .await
            .unwrap();
        store
            .commit(&alice, &hash, &granted, &event(Action::Grant, "h1", 500, 30))
            .await
            .unwrap();

        let actions: Vec<Action> = store
            .get_history(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec![Action::Grant, Action::Revoke, Action::Grant]);
        assert_eq!(store.history_len(&alice).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sqlite_keeps_timestamps_above_i64_max() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = Principal::derive("alice");

        for (hash, valid_until) in [("h1", i64::MAX as u64 + 1), ("h2", u64::MAX)] {
            let resource = ResourceHash::from(hash);
            let record = AuthorizationRecord::granted(AppId::from("app_xyz"), valid_until);
            store
                .commit(&alice, &resource, &record, &event(Action::Grant, hash, valid_until, 1))
                .await
                .unwrap();

            assert_eq!(store.get_record(&alice, &resource).await.unwrap(), Some(record));
        }

        let history = store.get_history(&alice).await.unwrap();
        assert_eq!(history[0].valid_until, i64::MAX as u64 + 1);
        assert_eq!(history[1].valid_until, u64::MAX);
    }

    #[test]
    fn test_unknown_action_reports_its_column() {
        let mut conn = Connection::open_in_memory().unwrap();
        migration::migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO authorization_history (
                principal, action, contract_hash, app_id, valid_until, timestamp
            ) VALUES (x'00', 'expire', 'h1', 'app_xyz', 10, 1)",
            [],
        )
        .unwrap();

        let err = conn
            .query_row(
                "SELECT valid_until, timestamp, action, contract_hash, app_id
                 FROM authorization_history",
                [],
                row_to_event,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, _)
        ));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authz.db");
        let alice = Principal::derive("alice");
        let hash = ResourceHash::from("hash_123");
        let record = AuthorizationRecord::granted(AppId::from("app_xyz"), 4600);

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .commit(&alice, &hash, &record, &event(Action::Grant, "hash_123", 4600, 1000))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get_record(&alice, &hash).await.unwrap(), Some(record));
        assert_eq!(reopened.list_records(&alice).await.unwrap().len(), 1);
        assert_eq!(reopened.history_len(&alice).await.unwrap(), 1);
    }
}
