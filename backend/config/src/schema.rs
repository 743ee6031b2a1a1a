//! LcForge runtime configuration schema.
//!
//! Every field is optional on disk; [`apply_all_defaults`](crate::apply_all_defaults)
//! fills in what the file leaves out, and the `*_or_default` accessors read
//! resolved values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for LcForge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcForgeConfig {
    /// HTTP server settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Text Extraction Gateway (OCR provider) settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrConfig>,

    /// Generative engine used by the Field Mapper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,

    /// Orchestrator timeouts and directive options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autofill: Option<AutofillConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl LcForgeConfig {
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn ocr(&self) -> OcrConfig {
        self.ocr.clone().unwrap_or_default()
    }

    pub fn engine(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }

    pub fn autofill(&self) -> AutofillConfig {
        self.autofill.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Largest accepted upload body, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,

    /// Evict sessions idle this long; 0 keeps them until deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl_secs: Option<u64>,
}

impl ServerConfig {
    pub fn bind_or_default(&self) -> String {
        self.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn max_upload_bytes_or_default(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        match self.session_ttl_secs.unwrap_or(DEFAULT_SESSION_TTL_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

/// Which Text Extraction Gateway implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrProviderKind {
    #[default]
    OcrSpace,
    Tesseract,
    Vision,
    Textract,
    Static,
}

impl OcrProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OcrSpace => "ocr_space",
            Self::Tesseract => "tesseract",
            Self::Vision => "vision",
            Self::Textract => "textract",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for OcrProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OcrProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "ocr_space" | "ocrspace" => Ok(Self::OcrSpace),
            "tesseract" => Ok(Self::Tesseract),
            "vision" => Ok(Self::Vision),
            "textract" => Ok(Self::Textract),
            "static" => Ok(Self::Static),
            other => Err(format!("unknown OCR provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<OcrProviderKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_space: Option<OcrSpaceConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract: Option<TesseractConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textract: Option<TextractConfig>,

    /// Fixed text returned by the `static` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_text: Option<String>,
}

impl OcrConfig {
    pub fn provider_or_default(&self) -> OcrProviderKind {
        self.provider.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSpaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesseractConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextractConfig {
    /// AWS region; falls back to the SDK's own resolution when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Which generative engine backs the Field Mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineProviderKind {
    #[default]
    Openai,
    Openrouter,
    Ollama,
    Mock,
}

impl EngineProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Openrouter => "openrouter",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }

    /// Base URL used when the config does not name one.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Openai => DEFAULT_OPENAI_BASE_URL,
            Self::Openrouter => DEFAULT_OPENROUTER_BASE_URL,
            Self::Ollama => DEFAULT_OLLAMA_BASE_URL,
            Self::Mock => "",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Openai | Self::Openrouter)
    }
}

impl fmt::Display for EngineProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::Openai),
            "openrouter" => Ok(Self::Openrouter),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => Err(format!("unknown engine provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<EngineProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Canned reply for the `mock` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_reply: Option<String>,
}

impl EngineConfig {
    pub fn provider_or_default(&self) -> EngineProviderKind {
        self.provider.unwrap_or_default()
    }

    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider_or_default().default_base_url().to_string())
    }

    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| DEFAULT_ENGINE_MODEL.to_string())
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_ENGINE_MAX_TOKENS)
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_ENGINE_TEMPERATURE)
    }
}

// ---------------------------------------------------------------------------
// Autofill
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillConfig {
    /// Gateway stage timeout; 0 disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_timeout_secs: Option<u64>,

    /// Mapping stage timeout; 0 disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_timeout_secs: Option<u64>,

    /// Send the current form values to the engine as context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_current_fields: Option<bool>,
}

impl AutofillConfig {
    pub fn extract_timeout_secs_or_default(&self) -> u64 {
        self.extract_timeout_secs.unwrap_or(DEFAULT_EXTRACT_TIMEOUT_SECS)
    }

    pub fn map_timeout_secs_or_default(&self) -> u64 {
        self.map_timeout_secs.unwrap_or(DEFAULT_MAP_TIMEOUT_SECS)
    }

    pub fn include_current_fields_or_default(&self) -> bool {
        self.include_current_fields.unwrap_or(true)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Emit JSON lines on the console instead of human-readable output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    /// Directory for daily-rolling NDJSON log files; no file output when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl LoggingConfig {
    pub fn level_or_default(&self) -> String {
        self.level.clone().unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }
}
