use std::sync::Arc;

use servdash_kv::KvStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
    pub data_key: Arc<str>,
}

impl AppState {
    pub fn new(kv: Arc<dyn KvStore>, data_key: &str) -> Self {
        Self {
            kv,
            data_key: Arc::from(data_key),
        }
    }
}
