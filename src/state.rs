use std::sync::Arc;

use ranklane_config::{CorsConfig, JwtConfig, StoreConfig};
use ranklane_core::AppError;
use ranklane_engine::{EngineError, PermissionFacade};

#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<PermissionFacade>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// In-memory engine, used by tests and local experiments.
    pub fn in_memory(jwt_config: JwtConfig) -> Self {
        Self::with_store(&StoreConfig::memory(), jwt_config)
    }

    pub fn with_store(store_config: &StoreConfig, jwt_config: JwtConfig) -> Self {
        Self {
            engine: Arc::new(PermissionFacade::from_config(store_config)),
            jwt_config,
            cors_config: CorsConfig {
                allowed_origins: Vec::new(),
            },
        }
    }

    /// Runs an engine call on the blocking pool.
    ///
    /// Engine calls take the partition writer lock and, with the file store,
    /// write the whole partition to disk before returning. The caller's span
    /// is carried over so engine events keep the request context.
    pub async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&PermissionFacade) -> Result<T, EngineError> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let span = tracing::Span::current();
        let result = tokio::task::spawn_blocking(move || span.in_scope(|| op(&engine)))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "engine task failed");
                AppError::internal_error("Internal server error".to_string())
            })?;
        result.map_err(AppError::from)
    }
}

pub fn init_app_state() -> AppState {
    let store_config = StoreConfig::from_env();
    tracing::info!(backend = ?store_config.backend, "Opening partition store");

    AppState {
        engine: Arc::new(PermissionFacade::from_config(&store_config)),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    }
}
