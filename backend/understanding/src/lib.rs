//! Text Extraction Gateway implementations.
//!
//! Each OCR provider implements [`lcforge_core::TextExtractor`]; which one runs
//! is chosen by `ocr.provider` in the config.

pub mod ocr_space;
pub mod static_text;
pub mod tesseract;
#[cfg(feature = "textract")]
pub mod textract;
pub mod vision;

pub use ocr_space::OcrSpaceExtractor;
pub use static_text::StaticExtractor;
pub use tesseract::TesseractExtractor;
#[cfg(feature = "textract")]
pub use textract::TextractExtractor;
pub use vision::{strip_code_fence, VisionExtractor};

use anyhow::{Result, bail};
use lcforge_config::defaults::{
    DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_SPACE_ENDPOINT, DEFAULT_TESSERACT_BINARY,
    DEFAULT_VISION_MODEL,
};
use lcforge_config::{OcrConfig, OcrProviderKind};
use lcforge_core::TextExtractor;
use std::sync::Arc;
use tracing::info;

/// Build the configured gateway once at startup.
pub async fn extractor_from_config(config: &OcrConfig) -> Result<Arc<dyn TextExtractor>> {
    let provider = config.provider_or_default();
    info!(provider = %provider, "Initializing text extraction gateway");

    let extractor: Arc<dyn TextExtractor> = match provider {
        OcrProviderKind::OcrSpace => {
            let settings = config.ocr_space.clone().unwrap_or_default();
            Arc::new(
                OcrSpaceExtractor::new(settings.api_key)
                    .with_endpoint(
                        settings
                            .endpoint
                            .unwrap_or_else(|| DEFAULT_OCR_SPACE_ENDPOINT.to_string()),
                    )
                    .with_language(
                        settings
                            .language
                            .unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string()),
                    ),
            )
        }
        OcrProviderKind::Tesseract => {
            let settings = config.tesseract.clone().unwrap_or_default();
            Arc::new(TesseractExtractor::new(
                settings
                    .binary
                    .unwrap_or_else(|| DEFAULT_TESSERACT_BINARY.to_string()),
                settings
                    .language
                    .unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string()),
            ))
        }
        OcrProviderKind::Vision => {
            let settings = config.vision.clone().unwrap_or_default();
            let mut extractor = VisionExtractor::new(
                settings.api_key,
                settings
                    .model
                    .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            );
            if let Some(url) = settings.base_url {
                extractor = extractor.with_base_url(url);
            }
            Arc::new(extractor)
        }
        OcrProviderKind::Static => match config.static_text.as_deref() {
            Some(text) if !text.trim().is_empty() => Arc::new(StaticExtractor::new(text)),
            _ => bail!("ocr.staticText is required for the static provider"),
        },
        #[cfg(feature = "textract")]
        OcrProviderKind::Textract => {
            let region = config.textract.clone().unwrap_or_default().region;
            Arc::new(TextractExtractor::from_env(region).await)
        }
        #[cfg(not(feature = "textract"))]
        OcrProviderKind::Textract => {
            bail!("the textract provider requires building with the 'textract' feature")
        }
    };
    Ok(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_default_provider() {
        let extractor = extractor_from_config(&OcrConfig::default()).await.unwrap();
        assert_eq!(extractor.name(), ocr_space::PROVIDER);
    }

    #[tokio::test]
    async fn static_provider_requires_text() {
        let config = OcrConfig {
            provider: Some(OcrProviderKind::Static),
            ..Default::default()
        };
        assert!(extractor_from_config(&config).await.is_err());

        let config = OcrConfig {
            provider: Some(OcrProviderKind::Static),
            static_text: Some("Amount: 1".into()),
            ..Default::default()
        };
        assert_eq!(extractor_from_config(&config).await.unwrap().name(), "static");
    }
}
