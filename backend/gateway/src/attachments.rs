//! Multipart image intake.
//!
//! Uploads arrive as a `multipart/form-data` body with the image in the
//! `topImage` part. A text part under that name is rejected, as is a payload
//! that does not sniff as an image.

use axum::extract::Multipart;
use axum::http::StatusCode;
use lcforge_core::{GatewayError, ImageUpload};
use tracing::debug;

use crate::error::ApiError;

pub const IMAGE_FIELD: &str = "topImage";

/// Pull the `topImage` part out of the body and validate it.
pub async fn read_image(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            return Err(GatewayError::InvalidFile("expected a file part".into()).into());
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!(filename = %filename, bytes = bytes.len(), "Received image upload");

        let upload = ImageUpload::new(bytes.to_vec(), Some(filename));
        upload.validate()?;
        return Ok(upload);
    }
    Err(GatewayError::NoFile.into())
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    let status = err.status();
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "Uploaded file is too large".to_string()
    } else {
        err.body_text()
    };
    ApiError::new(status, message)
}
