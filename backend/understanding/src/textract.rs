//! AWS Textract gateway using the official AWS SDK.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{BlockType, Document};
use lcforge_core::{ExtractedText, GatewayError, ImageUpload, TextExtractor};
use tracing::{debug, info};

pub const PROVIDER: &str = "textract";

pub struct TextractExtractor {
    client: aws_sdk_textract::Client,
}

impl TextractExtractor {
    /// Build a client from the standard AWS credential and region chain.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            debug!(region = %region, "Using AWS region");
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self {
            client: aws_sdk_textract::Client::new(&config),
        }
    }
}

#[async_trait]
impl TextExtractor for TextractExtractor {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, image: &ImageUpload) -> Result<ExtractedText, GatewayError> {
        image.validate()?;
        info!(bytes = image.bytes.len(), "[Textract] Detecting document text");

        let document = Document::builder()
            .bytes(Blob::new(image.bytes.clone()))
            .build();
        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|e| GatewayError::provider(PROVIDER, e.to_string()))?;

        let text = output
            .blocks()
            .iter()
            .filter(|b| b.block_type() == Some(&BlockType::Line))
            .filter_map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n");

        ExtractedText::new(text, PROVIDER)
    }
}
