//! Main HTTP server and route table.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use lcforge_autofill::{AutofillSession, StageTimeouts};
use lcforge_core::TextExtractor;
use lcforge_mapper::FieldMapper;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::session_registry::SessionRegistry;
use crate::{health_api, sessions_api, stateless_api};

/// Application state shared across routes.
pub struct AppState {
    pub extractor: Arc<dyn TextExtractor>,
    pub mapper: Arc<FieldMapper>,
    pub sessions: SessionRegistry,
    pub timeouts: StageTimeouts,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        mapper: Arc<FieldMapper>,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            extractor,
            mapper,
            sessions: SessionRegistry::new(),
            timeouts,
            started_at: Instant::now(),
        }
    }

    /// Evict sessions idle longer than `ttl`; `None` keeps them until deleted.
    pub fn with_session_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.sessions = SessionRegistry::with_ttl(ttl);
        self
    }

    /// A fresh session wired to the shared gateway and mapper.
    pub fn new_session(&self) -> Arc<AutofillSession> {
        Arc::new(AutofillSession::new(
            self.extractor.clone(),
            self.mapper.clone(),
            self.timeouts,
        ))
    }
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health_api::get_health))
        .route("/api/sessions", post(sessions_api::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions_api::get_session).delete(sessions_api::delete_session),
        )
        .route("/api/sessions/:id/fields/:field", put(sessions_api::set_field))
        .route("/api/sessions/:id/upload", post(sessions_api::upload))
        .route("/api/sessions/:id/retry", post(sessions_api::retry))
        .route("/api/sessions/:id/cancel", post(sessions_api::cancel))
        .route("/api/imagetotext", post(stateless_api::image_to_text))
        .route("/api/ai", post(stateless_api::map_text))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    max_upload_bytes: usize,
) -> Result<()> {
    let app = build_router(state.clone(), max_upload_bytes);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, session_ttl = ?state.sessions.ttl(), "HTTP API listening");
    let sweeper = state.sessions.spawn_sweeper();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
