use std::sync::Arc;

use autodash_db::SessionProvider;

use crate::config::ServerConfig;
use crate::dashboard::DashboardOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState<P>>`.
///
/// Generic over the session provider so tests can swap in a fake database.
/// Cheaply cloneable: everything is behind `Arc`.
pub struct AppState<P> {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Runs one page load per request on its own connection.
    pub orchestrator: Arc<DashboardOrchestrator<P>>,
}

impl<P: SessionProvider> AppState<P> {
    pub fn new(config: ServerConfig, provider: P) -> Self {
        let orchestrator = DashboardOrchestrator::new(
            provider,
            config.query_timeout(),
            config.request_timeout(),
        );
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}
