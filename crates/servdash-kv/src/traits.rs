use async_trait::async_trait;

use crate::error::KvResult;

/// Whole-value key-value storage.
///
/// All implementations must satisfy these invariants:
/// - `put` replaces the entire value stored under the key.
/// - A concurrent `get` sees either the old or the new value, never a mix.
/// - Keys are checked with [`validate_key`](crate::validate_key) before use.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: String) -> KvResult<()>;

    /// Delete the value under `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> KvResult<bool>;

    /// Check whether a value exists under `key`.
    async fn exists(&self, key: &str) -> KvResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
