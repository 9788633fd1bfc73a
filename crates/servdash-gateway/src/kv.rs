use std::sync::Arc;

use async_trait::async_trait;
use servdash_kv::KvStore;
use servdash_types::Collection;
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};
use crate::http::decode_collection;
use crate::traits::{Gateway, WriteAck};

/// Key under which the collection is stored.
pub const DEFAULT_DATA_KEY: &str = "dashboardData";

/// Gateway that talks to a [`KvStore`] directly, without HTTP.
///
/// Stores the collection as JSON text under a single key, the same layout
/// the HTTP data endpoint uses.
pub struct KvGateway<S: KvStore> {
    store: Arc<S>,
    key: String,
}

impl<S: KvStore> KvGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_key(store, DEFAULT_DATA_KEY)
    }

    pub fn with_key(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl<S: KvStore> Gateway for KvGateway<S> {
    async fn read(&self) -> GatewayResult<Collection> {
        match self.store.get(&self.key).await? {
            Some(text) => decode_collection(&text),
            None => Ok(Collection::new()),
        }
    }

    async fn write(&self, collection: &Collection) -> GatewayResult<WriteAck> {
        let text = collection
            .to_json()
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        self.store.put(&self.key, text).await?;
        debug!(key = %self.key, items = collection.len(), "collection stored");
        Ok(WriteAck::ok("data saved"))
    }
}
