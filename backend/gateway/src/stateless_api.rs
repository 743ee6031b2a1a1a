//! Session-free routes: one-off OCR plus mapping, or mapping of raw text.
//!
//! Both answer with a complete record under `extractedFields` so callers can
//! bind it straight onto a blank form.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Multipart, State};
use lcforge_core::{AutofillError, FieldRecord, merge};
use lcforge_mapper::ExtractionAttempt;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::attachments::read_image;
use crate::error::ApiError;
use crate::server::AppState;

async fn limited<T>(
    stage: &str,
    limit: Option<Duration>,
    fut: impl Future<Output = T>,
) -> Result<T, AutofillError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| AutofillError::TimedOut {
                stage: stage.to_string(),
                seconds: limit.as_secs(),
            }),
        None => Ok(fut.await),
    }
}

async fn run_mapping(
    state: &AppState,
    text: &str,
    instructions: Option<&str>,
) -> Result<Value, ApiError> {
    let attempt: ExtractionAttempt = limited(
        "field mapping",
        state.timeouts.map,
        state.mapper.map_with_instructions(text, None, instructions),
    )
    .await??;

    let partial = match (attempt.partial(), attempt.failure()) {
        (Some(partial), _) => partial,
        (None, Some(err)) => return Err(err.into()),
        (None, None) => return Err(AutofillError::Unparseable.into()),
    };
    Ok(json!({
        "generatedText": attempt.reply.clone().unwrap_or_default(),
        "extractedFields": merge(&FieldRecord::new(), partial),
        "updated": partial.fields(),
    }))
}

/// `POST /api/imagetotext`
pub async fn image_to_text(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let image = read_image(multipart).await?;
    let extracted = limited(
        "text extraction",
        state.timeouts.extract,
        state.extractor.extract(&image),
    )
    .await??;

    let ai = run_mapping(&state, &extracted.text, None).await?;
    Ok(Json(json!({
        "success": true,
        "ocrText": extracted.text,
        "ocrProvider": extracted.provider,
        "ai": ai,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MapTextRequest {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// `POST /api/ai`
pub async fn map_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MapTextRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(data) = req.data.filter(|d| !d.trim().is_empty()) else {
        return Err(ApiError::bad_request("Missing data"));
    };
    let prompt = req.prompt.as_deref().filter(|p| !p.trim().is_empty());

    let mut body = run_mapping(&state, &data, prompt).await?;
    body["success"] = json!(true);
    Ok(Json(body))
}
