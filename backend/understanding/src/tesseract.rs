//! Local Tesseract gateway: pipes the image through `tesseract stdin stdout`.

use async_trait::async_trait;
use lcforge_core::{ExtractedText, GatewayError, ImageUpload, TextExtractor};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

pub const PROVIDER: &str = "tesseract";

pub struct TesseractExtractor {
    binary: String,
    language: String,
}

impl TesseractExtractor {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn extract(&self, image: &ImageUpload) -> Result<ExtractedText, GatewayError> {
        image.validate()?;
        info!(binary = %self.binary, lang = %self.language, "[Tesseract] Recognizing image");

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    GatewayError::NotConfigured(format!("'{}' is not installed", self.binary))
                }
                _ => GatewayError::provider(PROVIDER, format!("failed to start: {e}")),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // The process may exit without reading everything; its exit status decides.
            if let Err(e) = stdin.write_all(&image.bytes).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(GatewayError::provider(PROVIDER, format!("stdin write failed: {e}")));
                }
                warn!("[Tesseract] Process closed stdin early");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GatewayError::provider(PROVIDER, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GatewayError::provider(
                PROVIDER,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        ExtractedText::new(String::from_utf8_lossy(&output.stdout).into_owned(), PROVIDER)
    }
}
