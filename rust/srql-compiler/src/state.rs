use crate::{config::AppConfig, query::QueryEngine, time::Clock};
use std::sync::Arc;

/// Handler state shared by every route.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide defaults; `/healthz` reports the backend and mode from here.
    pub config: Arc<AppConfig>,
    pub engine: QueryEngine,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        let engine = QueryEngine::with_clock(Arc::clone(&config), clock);
        Self { config, engine }
    }
}
