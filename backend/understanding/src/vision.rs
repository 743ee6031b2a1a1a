//! Vision gateway: asks an OpenAI-compatible vision model to transcribe the image.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use lcforge_core::{ExtractedText, GatewayError, ImageUpload, TextExtractor};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::info;

pub const PROVIDER: &str = "vision";

const SYSTEM_PROMPT: &str = "You are an assistant whose only job is to extract the full text contents \
from the provided image. Return ONLY the extracted text (no JSON, no commentary). \
If you can't extract text, return an empty string.";

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:\w*\n)?([\s\S]*?)```").unwrap());

/// Return the inside of the first fenced block, or the trimmed reply when unfenced.
pub fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    match FENCE_RE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) if !inner.as_str().trim().is_empty() => inner.as_str().trim().to_string(),
        _ => trimmed.to_string(),
    }
}

pub struct VisionExtractor {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl VisionExtractor {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl TextExtractor for VisionExtractor {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, image: &ImageUpload) -> Result<ExtractedText, GatewayError> {
        image.validate()?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::NotConfigured("vision API key not configured".into()))?;

        info!(model = %self.model, bytes = image.bytes.len(), "[Vision] Transcribing image");
        let b64 = STANDARD.encode(&image.bytes);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Extract text from the image." },
                        { "type": "image_url",
                          "image_url": { "url": format!("data:{};base64,{}", image.mime_type, b64) } }
                    ]
                }
            ],
            "max_tokens": 2048
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::provider(PROVIDER, format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::provider(PROVIDER, format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::provider(PROVIDER, format!("invalid response: {e}")))?;
        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");

        ExtractedText::new(strip_code_fence(reply), PROVIDER)
    }
}
