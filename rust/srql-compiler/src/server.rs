use crate::{
    config::AppConfig,
    error::Result,
    query::{Artifact, QueryRequest},
    state::AppState,
    time::{Clock, SystemClock},
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct Server {
    config: Arc<AppConfig>,
    state: AppState,
}

impl Server {
    pub fn new(config: AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Server whose translations resolve date keywords against `clock`.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let config = Arc::new(config);
        let state = AppState::new(Arc::clone(&config), clock);
        Self { config, state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/healthz", get(Self::health))
            .route("/translate", post(Self::translate))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;
        info!(
            %addr,
            backend = %self.config.backend,
            mode = %self.config.default_mode,
            "SRQL compiler listening"
        );
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
        Json(json!({
            "status": "ok",
            "backend": state.config.backend,
            "mode": state.config.default_mode,
        }))
    }

    async fn translate(
        State(state): State<AppState>,
        Json(request): Json<QueryRequest>,
    ) -> Result<Json<Artifact>> {
        let artifact = state.engine.translate(request)?;
        Ok(Json(artifact))
    }
}
