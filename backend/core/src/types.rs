use serde::Serialize;

use crate::error::GatewayError;

/// Minimum number of whitespace-separated tokens worth sending to the engine.
pub const MIN_TOKENS: usize = 3;

/// Count whitespace-separated tokens.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// An uploaded document image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    /// MIME type sniffed from the bytes, falling back to the filename.
    pub mime_type: &'static str,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, filename: Option<String>) -> Self {
        let mime_type = sniff_mime_type(&bytes)
            .or_else(|| filename.as_deref().map(mime_from_extension))
            .unwrap_or("application/octet-stream");
        Self {
            bytes,
            filename,
            mime_type,
        }
    }

    /// Reject empty and non-image payloads before any provider is called.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.bytes.is_empty() {
            return Err(GatewayError::NoFile);
        }
        if !is_image(self.mime_type) {
            return Err(GatewayError::InvalidFile(format!(
                "expected an image, got {}",
                self.mime_type
            )));
        }
        Ok(())
    }

    /// Filename to report to providers that want one.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("upload")
    }

    /// File extension matching the sniffed MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tif",
            "application/pdf" => "pdf",
            _ => "jpg",
        }
    }
}

/// Text returned by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    /// Name of the provider that produced the text.
    pub provider: String,
}

impl ExtractedText {
    /// Wrap provider output, failing with [`GatewayError::NoText`] when blank.
    pub fn new(text: impl Into<String>, provider: impl Into<String>) -> Result<Self, GatewayError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(GatewayError::NoText);
        }
        Ok(Self {
            text,
            provider: provider.into(),
        })
    }

    pub fn token_count(&self) -> usize {
        token_count(&self.text)
    }
}

/// Detect a MIME type from leading magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"II*\0", "image/tiff"),
        (b"MM\0*", "image/tiff"),
        (b"%PDF", "application/pdf"),
    ];
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, mime)| *mime)
}

/// Detect MIME type by file extension.
pub fn mime_from_extension(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}
