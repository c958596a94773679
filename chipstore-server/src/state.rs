//! Application state shared across handlers

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::ConnectionManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub config: ServerConfig,
    pub connections: ConnectionManager,
}

impl AppState {
    pub fn new(config: ServerConfig, connections: ConnectionManager) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                connections,
            }),
        }
    }

    /// Build state from configuration, wiring the real MongoDB connector.
    pub fn from_config(config: ServerConfig) -> Self {
        let connections =
            ConnectionManager::new(config.mongodb_uri.clone(), config.database.clone());
        Self::new(config, connections)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.inner.connections
    }
}
