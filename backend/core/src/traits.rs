use anyhow::Result;
use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{ExtractedText, ImageUpload};

/// The Text Extraction Gateway: turns an uploaded image into raw text.
///
/// Each OCR provider (OCR.space, Tesseract, a vision model, Textract) is one
/// implementation; which one runs is a configuration choice.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Provider name (e.g., "ocr_space", "tesseract").
    fn name(&self) -> &str;

    /// Extract text from the image.
    async fn extract(&self, image: &ImageUpload) -> Result<ExtractedText, GatewayError>;
}

/// Trait for the generative engine behind the Field Mapper.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a completion request and return the response text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}
