use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{KvError, KvResult};
use crate::key::validate_key;
use crate::traits::KvStore;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and servers started without a data directory. Values
/// are lost when the store is dropped.
pub struct InMemoryKvStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> KvResult<Vec<String>> {
        let map = self.values.read().map_err(|_| KvError::Poisoned)?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        validate_key(key)?;
        let map = self.values.read().map_err(|_| KvError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> KvResult<()> {
        validate_key(key)?;
        let mut map = self.values.write().map_err(|_| KvError::Poisoned)?;
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<bool> {
        validate_key(key)?;
        let mut map = self.values.write().map_err(|_| KvError::Poisoned)?;
        Ok(map.remove(key).is_some())
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("key_count", &self.len())
            .finish()
    }
}
