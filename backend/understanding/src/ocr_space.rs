//! OCR.space gateway.
//!
//! Multipart POST of the image with `apikey` and `language`; the text comes
//! back in `ParsedResults[*].ParsedText`.

use async_trait::async_trait;
use lcforge_core::{ExtractedText, GatewayError, ImageUpload, TextExtractor};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

pub const PROVIDER: &str = "ocr_space";
const DEFAULT_ENDPOINT: &str = "https://api.ocr.space/parse/image";

pub struct OcrSpaceExtractor {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    language: String,
}

impl OcrSpaceExtractor {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "eng".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    /// A string or an array of strings, depending on the failure.
    #[serde(default)]
    error_message: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// Pull the recognized text out of an OCR.space response body.
pub(crate) fn parse_response(body: &str) -> Result<String, GatewayError> {
    let response: OcrSpaceResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::provider(PROVIDER, format!("invalid response: {e}")))?;

    if response.is_errored_on_processing {
        let message = match &response.error_message {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => "processing failed".to_string(),
        };
        return Err(GatewayError::provider(PROVIDER, message));
    }

    Ok(response
        .parsed_results
        .iter()
        .map(|r| r.parsed_text.trim_end())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

#[async_trait]
impl TextExtractor for OcrSpaceExtractor {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, image: &ImageUpload) -> Result<ExtractedText, GatewayError> {
        image.validate()?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::NotConfigured("OCR API key not configured".into()))?;

        info!(bytes = image.bytes.len(), mime = image.mime_type, "[OCR.space] Recognizing image");

        let part = Part::bytes(image.bytes.clone())
            .file_name(format!("image.{}", image.extension()))
            .mime_str(image.mime_type)
            .map_err(|e| GatewayError::provider(PROVIDER, e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("apikey", api_key.to_string())
            .text("language", self.language.clone())
            .text("filetype", image.extension().to_uppercase());

        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::provider(PROVIDER, format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::provider(PROVIDER, format!("unreadable response: {e}")))?;
        if !status.is_success() {
            return Err(GatewayError::provider(PROVIDER, format!("HTTP {status}: {body}")));
        }

        let text = parse_response(&body)?;
        debug!(chars = text.len(), "[OCR.space] Response parsed");
        ExtractedText::new(text, PROVIDER)
    }
}
