use std::sync::Arc;

use crate::auth::jwt::TokenVerifier;
use crate::config::ServerConfig;
use crate::engine::dispatcher::BulkDispatcher;
use crate::engine::executor::BatchExecutor;
use crate::engine::progress::ProgressStore;
use crate::engine::store::CatalogStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalog_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Bearer token verifier used by the auth extractors.
    pub tokens: TokenVerifier,
    /// Entity store the bulk engine and exporter work against.
    pub catalog: Arc<dyn CatalogStore>,
    /// Progress snapshot store.
    pub progress: Arc<dyn ProgressStore>,
    /// Starts detached bulk operations.
    pub dispatcher: BulkDispatcher,
}

impl AppState {
    /// Wire the bulk engine over the given stores.
    pub fn new(
        pool: catalog_db::DbPool,
        config: ServerConfig,
        catalog: Arc<dyn CatalogStore>,
        progress: Arc<dyn ProgressStore>,
    ) -> Self {
        let executor = Arc::new(BatchExecutor::new(
            Arc::clone(&catalog),
            Arc::clone(&progress),
            config.bulk.executor_settings(),
        ));

        Self {
            pool,
            tokens: TokenVerifier::new(&config.jwt),
            config: Arc::new(config),
            catalog,
            progress,
            dispatcher: BulkDispatcher::new(executor),
        }
    }
}
