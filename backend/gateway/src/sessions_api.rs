//! Session routes: one form per session, driven by uploads and user edits.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lcforge_autofill::{AutofillSession, AutofillState, SubmitOutcome};
use lcforge_core::{AutofillError, FieldName};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::attachments::read_image;
use crate::error::ApiError;
use crate::server::AppState;

async fn lookup(state: &AppState, id: &str) -> Result<Arc<AutofillSession>, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Session not found: {id}")))
}

fn session_view(session: &AutofillSession) -> Value {
    let snapshot = session.snapshot();
    json!({
        "success": true,
        "sessionId": session.id(),
        "state": snapshot.state,
        "form": snapshot.fields,
        "error": snapshot.error,
        "lastUpload": snapshot.last_upload,
        "updatedAt": snapshot.updated_at,
    })
}

/// `POST /api/sessions`
pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.new_session();
    state.sessions.register(session.clone()).await;
    info!(session_id = %session.id(), "Session created");
    (StatusCode::CREATED, Json(session_view(&session)))
}

/// `GET /api/sessions/:id`
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session_view(&session)))
}

/// `DELETE /api/sessions/:id`
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.sessions.unregister(&id).await {
        return Err(ApiError::not_found(format!("Session not found: {id}")));
    }
    info!(session_id = %id, "Session deleted");
    Ok(Json(json!({ "success": true, "sessionId": id })))
}

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    #[serde(default)]
    pub value: String,
}

/// `PUT /api/sessions/:id/fields/:field`
pub async fn set_field(
    State(state): State<Arc<AppState>>,
    Path((id, field)): Path<(String, String)>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<Value>, ApiError> {
    let field: FieldName = field
        .parse()
        .map_err(|e: lcforge_core::UnknownField| ApiError::bad_request(e.to_string()))?;
    let session = lookup(&state, &id).await?;
    let changed = session.set_field(field, &edit.value);
    Ok(Json(json!({
        "success": true,
        "changed": changed,
        "form": session.snapshot().fields,
    })))
}

/// `POST /api/sessions/:id/upload`
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let session = lookup(&state, &id).await?;
    let image = read_image(multipart).await?;

    let outcome = match session.submit(image).await {
        Ok(outcome) => outcome,
        Err(AutofillError::Busy) if session.state() == AutofillState::Failed => {
            return Err(ApiError::conflict(
                "The last extraction failed; retry before uploading again",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let status = match &outcome {
        SubmitOutcome::Merged { .. } => StatusCode::OK,
        SubmitOutcome::Failed(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let mut body = serde_json::to_value(&outcome)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    body["success"] = json!(outcome.is_merged());
    body["sessionId"] = json!(session.id());
    Ok((status, Json(body)).into_response())
}

/// `POST /api/sessions/:id/retry`
pub async fn retry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = lookup(&state, &id).await?;
    if !session.retry() {
        return Err(ApiError::conflict("Nothing to retry: the session has not failed"));
    }
    Ok(Json(session_view(&session)))
}

/// `POST /api/sessions/:id/cancel`
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = lookup(&state, &id).await?;
    let cancelled = session.cancel();
    Ok(Json(json!({ "success": true, "cancelled": cancelled })))
}
