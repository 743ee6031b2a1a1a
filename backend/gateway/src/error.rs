//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lcforge_core::{AutofillError, FailureKind, GatewayError};
use lcforge_logging::redact_sensitive_data;
use serde_json::json;

/// A failed request: status code plus the `{success: false, message}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub kind: Option<FailureKind>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            kind: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

pub fn gateway_status(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::NoFile | GatewayError::InvalidFile(_) => StatusCode::BAD_REQUEST,
        GatewayError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GatewayError::Provider { .. } => StatusCode::BAD_GATEWAY,
        GatewayError::NoText => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self {
            status: gateway_status(&err),
            message: redact_sensitive_data(&err.to_string()),
            kind: Some(FailureKind::GatewayError),
        }
    }
}

impl From<AutofillError> for ApiError {
    fn from(err: AutofillError) -> Self {
        let status = match &err {
            AutofillError::Gateway(inner) => gateway_status(inner),
            AutofillError::InsufficientText { .. }
            | AutofillError::ExplicitFailure
            | AutofillError::Unparseable => StatusCode::UNPROCESSABLE_ENTITY,
            AutofillError::Engine { .. } => StatusCode::BAD_GATEWAY,
            AutofillError::Busy => StatusCode::CONFLICT,
            AutofillError::Cancelled => StatusCode::CONFLICT,
            AutofillError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        Self {
            status,
            message: redact_sensitive_data(&err.to_string()),
            kind: (!matches!(err, AutofillError::Busy)).then(|| err.kind()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "success": false, "message": self.message });
        if let Some(kind) = self.kind {
            body["kind"] = json!(kind);
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_failure_cause() {
        assert_eq!(ApiError::from(GatewayError::NoFile).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(AutofillError::ExplicitFailure).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(AutofillError::TimedOut {
                stage: "field mapping".into(),
                seconds: 5
            })
            .status,
            StatusCode::GATEWAY_TIMEOUT
        );
        let busy = ApiError::from(AutofillError::Busy);
        assert_eq!(busy.status, StatusCode::CONFLICT);
        assert!(busy.kind.is_none());
    }

    #[test]
    fn provider_messages_are_scrubbed() {
        let err = ApiError::from(AutofillError::Engine {
            provider: "openai".into(),
            message: "Bearer sk-live-0123456789abcdefghijklmn rejected".into(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(!err.message.contains("sk-live"));
    }
}
