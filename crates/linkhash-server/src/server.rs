use std::sync::Arc;

use tokio::net::TcpListener;

use linkhash_store::{InMemoryLinkStore, LinkStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// linkhash HTTP server.
///
/// Owns the link store for the lifetime of the process; handlers reach it
/// through [`AppState`].
pub struct LinkServer {
    config: ServerConfig,
    store: Arc<dyn LinkStore>,
}

impl LinkServer {
    /// Create a server with a fresh in-memory store.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let store = InMemoryLinkStore::with_key_length(config.key_length)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Create a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn LinkStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let state = AppState::new(Arc::clone(&self.store), &self.config.base_url);
        build_router(state, self.config.request_timeout())
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            base_url = %self.config.base_url,
            key_length = self.config.key_length,
            "linkhash server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!(entries = self.store.len(), "linkhash server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
