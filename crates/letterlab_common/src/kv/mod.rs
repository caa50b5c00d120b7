//! Key-value persistence abstraction.
//!
//! Every store in this crate talks to storage through [`KvStore`], a flat
//! string-keyed, string-valued map. Production code uses [`SqliteKvStore`];
//! tests use [`MemoryKvStore`].

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::{DbLocation, SqliteKvStore};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Async string map that survives process restarts.
///
/// No transactions and no multi-key atomicity. Two concurrent
/// read-modify-write cycles on one key are last-write-wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently stored
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// Shared handle passed to every store constructor
pub type SharedKv = Arc<dyn KvStore>;
