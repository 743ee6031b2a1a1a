use serde::Serialize;
use thiserror::Error;

/// Why the Text Extraction Gateway could not produce text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file uploaded: {0}")]
    InvalidFile(String),

    #[error("OCR provider not configured: {0}")]
    NotConfigured(String),

    #[error("OCR provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("No text found in the uploaded image")]
    NoText,
}

impl GatewayError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Top-level error type for one autofill attempt.
#[derive(Debug, Error)]
pub enum AutofillError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Not enough text to extract fields: {tokens} token(s), below the {minimum}-token minimum")]
    InsufficientText { tokens: usize, minimum: usize },

    #[error("The document could not be mapped to any form field")]
    ExplicitFailure,

    #[error("The AI reply could not be parsed")]
    Unparseable,

    #[error("AI provider error ({provider}): {message}")]
    Engine { provider: String, message: String },

    #[error("An extraction is already in progress")]
    Busy,

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("{stage} timed out after {seconds}s")]
    TimedOut { stage: String, seconds: u64 },
}

/// Coarse failure category shown to the user alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    GatewayError,
    NoUsableData,
    EngineError,
    Cancelled,
    TimedOut,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GatewayError => "gateway_error",
            Self::NoUsableData => "no_usable_data",
            Self::EngineError => "engine_error",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
        }
    }
}

impl AutofillError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Gateway(_) => FailureKind::GatewayError,
            Self::InsufficientText { .. } | Self::ExplicitFailure | Self::Unparseable => {
                FailureKind::NoUsableData
            }
            Self::Engine { .. } => FailureKind::EngineError,
            Self::Cancelled => FailureKind::Cancelled,
            Self::TimedOut { .. } => FailureKind::TimedOut,
            // Busy is rejected before an attempt starts; it never reaches Failed.
            Self::Busy => FailureKind::EngineError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_usable_data_kinds() {
        assert_eq!(AutofillError::ExplicitFailure.kind(), FailureKind::NoUsableData);
        assert_eq!(
            AutofillError::InsufficientText { tokens: 1, minimum: 3 }.kind(),
            FailureKind::NoUsableData
        );
    }

    #[test]
    fn gateway_message_is_verbatim() {
        let err = AutofillError::from(GatewayError::NoFile);
        assert_eq!(err.to_string(), "No file uploaded");
        assert_eq!(err.kind(), FailureKind::GatewayError);
    }
}
