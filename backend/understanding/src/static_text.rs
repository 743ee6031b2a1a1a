//! Fixed-output gateway for demos, tests and offline runs.

use async_trait::async_trait;
use lcforge_core::{ExtractedText, GatewayError, ImageUpload, TextExtractor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const PROVIDER: &str = "static";

/// Returns the same text (or the same error) for every valid upload.
pub struct StaticExtractor {
    result: Result<String, GatewayError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error` once the upload passes validation.
    pub fn failing(error: GatewayError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, image: &ImageUpload) -> Result<ExtractedText, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        image.validate()?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.result {
            Ok(text) => ExtractedText::new(text.clone(), PROVIDER),
            Err(e) => Err(e.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[tokio::test]
    async fn returns_configured_text() {
        let extractor = StaticExtractor::new("Amount: 100 USD");
        let text = extractor
            .extract(&ImageUpload::new(PNG.to_vec(), None))
            .await
            .unwrap();
        assert_eq!(text.text, "Amount: 100 USD");
        assert_eq!(extractor.call_count(), 1);
    }

    #[tokio::test]
    async fn blank_text_is_no_text() {
        let extractor = StaticExtractor::new("   ");
        let err = extractor
            .extract(&ImageUpload::new(PNG.to_vec(), None))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NoText);
    }

    #[tokio::test]
    async fn failing_extractor_returns_its_error() {
        let extractor = StaticExtractor::failing(GatewayError::provider("static", "down"));
        let err = extractor
            .extract(&ImageUpload::new(PNG.to_vec(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Provider { .. }));
    }
}
