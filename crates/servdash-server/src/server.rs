use std::sync::Arc;

use servdash_kv::{validate_key, FileKvStore, InMemoryKvStore, KvStore};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// servdash HTTP server.
pub struct DashboardServer {
    config: ServerConfig,
    state: AppState,
}

impl DashboardServer {
    /// Open the configured store: file-backed under `data_dir`, else in-memory.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let kv: Arc<dyn KvStore> = match &config.data_dir {
            Some(dir) => Arc::new(FileKvStore::open(dir).await?),
            None => {
                tracing::warn!("no data directory configured; data is kept in memory only");
                Arc::new(InMemoryKvStore::new())
            }
        };
        Self::with_store(config, kv)
    }

    /// Serve from an already opened store.
    pub fn with_store(config: ServerConfig, kv: Arc<dyn KvStore>) -> ServerResult<Self> {
        validate_key(&config.data_key)?;
        let state = AppState::new(kv, &config.data_key);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            data_key = %self.config.data_key,
            "servdash server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown requested");
            })
            .await?;
        Ok(())
    }
}
