//! Key-value store port - persistence abstraction

use async_trait::async_trait;

use crate::domain::result::Result;

/// Durable string-to-string storage
///
/// Both the user collection and the session pointer live in one shared
/// namespace of this store. Implementations (adapters) decide where the
/// data actually goes; values must survive a process restart for any
/// adapter used outside of tests.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
