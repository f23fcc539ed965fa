//! # Pod Authorization Store
//!
//! Storage abstraction for the authorization registry. Provides a trait-based
//! interface for record and history persistence with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`Store`] trait,
//! allowing the registry to be storage-agnostic. The durable implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Commit a planned transition in one call
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pod_authz_store::{SqliteStore, Store};
//! use pod_authz_core::{Principal, ResourceHash};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("authz.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let alice = Principal::derive("alice");
//!     let history = store.get_history(&alice).await.unwrap();
//!     assert!(history.is_empty());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic commits**: record upsert and history append land together
//! - **Append-only history**: ordered by insertion, never pruned
//! - **Records are never deleted**: revoked records stay with `granted = false`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
