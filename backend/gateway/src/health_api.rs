//! `GET /api/health`

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub success: bool,
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub ocr_provider: String,
    pub engine_provider: String,
    pub model: String,
    pub sessions: usize,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(HealthReport {
        success: true,
        status: "ok",
        service: "lcforge",
        version: env!("CARGO_PKG_VERSION"),
        ocr_provider: state.extractor.name().to_string(),
        engine_provider: state.mapper.provider_name().to_string(),
        model: state.mapper.model().to_string(),
        sessions: state.sessions.len().await,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
