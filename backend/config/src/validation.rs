//! Config validation: deep schema checks with user-friendly error messages.

use std::collections::HashMap;

use crate::schema::{EngineProviderKind, LcForgeConfig, OcrProviderKind};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append another report's findings.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &LcForgeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_ocr(config, &mut report);
    validate_engine(config, &mut report);
    validate_logging(config, &mut report);
    report
}

/// Check the `LCFORGE_*` override variables in the process environment.
pub fn validate_env() -> ValidationReport {
    validate_env_with(&std::env::vars().collect())
}

/// Overrides that cannot be parsed are ignored at load time; each one is a warning.
pub fn validate_env_with(env: &HashMap<String, String>) -> ValidationReport {
    let mut report = ValidationReport::default();
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(port) = get("LCFORGE_PORT") {
        if port.parse::<u16>().is_err() {
            report.warn("LCFORGE_PORT", format!("Ignoring invalid port '{port}'"));
        }
    }
    if let Some(Err(e)) = get("LCFORGE_OCR_PROVIDER").map(str::parse::<OcrProviderKind>) {
        report.warn("LCFORGE_OCR_PROVIDER", format!("Ignoring override: {e}"));
    }
    if let Some(Err(e)) = get("LCFORGE_ENGINE_PROVIDER").map(str::parse::<EngineProviderKind>) {
        report.warn("LCFORGE_ENGINE_PROVIDER", format!("Ignoring override: {e}"));
    }
    report
}

fn validate_server(config: &LcForgeConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    if server.port == Some(0) {
        report.error("server.port", "port must be > 0");
    }
    if let Some(port) = server.port {
        if port < 1024 && port != 80 && port != 443 && port != 0 {
            report.warn(
                "server.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
    if server.max_upload_bytes == Some(0) {
        report.error("server.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

/// Missing OCR keys are warnings: the gateway reports "not configured" per request.
fn validate_ocr(config: &LcForgeConfig, report: &mut ValidationReport) {
    let Some(ocr) = &config.ocr else { return };
    match ocr.provider_or_default() {
        OcrProviderKind::OcrSpace => {
            let has_key = ocr
                .ocr_space
                .as_ref()
                .and_then(|s| s.api_key.as_deref())
                .is_some_and(|k| !k.is_empty());
            if !has_key {
                report.warn(
                    "ocr.ocrSpace.apiKey",
                    "OCR API key not configured; uploads will fail (set OCR_SPACE_API_KEY)",
                );
            }
        }
        OcrProviderKind::Vision => {
            let has_key = ocr
                .vision
                .as_ref()
                .and_then(|v| v.api_key.as_deref())
                .is_some_and(|k| !k.is_empty());
            if !has_key {
                report.warn("ocr.vision.apiKey", "Vision API key not configured");
            }
        }
        OcrProviderKind::Static => {
            if ocr.static_text.as_deref().map_or(true, |t| t.trim().is_empty()) {
                report.error("ocr.staticText", "staticText is required for the static provider");
            }
        }
        OcrProviderKind::Textract => {
            if cfg!(not(feature = "textract")) {
                report.error(
                    "ocr.provider",
                    "textract provider requires building with the 'textract' feature",
                );
            }
        }
        OcrProviderKind::Tesseract => {}
    }
}

fn validate_engine(config: &LcForgeConfig, report: &mut ValidationReport) {
    let Some(engine) = &config.engine else { return };
    let provider = engine.provider_or_default();

    if provider.requires_api_key()
        && engine.api_key.as_deref().map_or(true, str::is_empty)
    {
        report.warn(
            "engine.apiKey",
            format!("No API key for engine provider '{provider}'; mapping will fail"),
        );
    }
    if provider == EngineProviderKind::Mock && engine.mock_reply.is_none() {
        report.warn("engine.mockReply", "Mock engine has no reply; it will return '{}'");
    }
    if let Some(model) = &engine.model {
        if model.trim().is_empty() {
            report.error("engine.model", "model cannot be empty");
        }
    }
    if engine.max_tokens == Some(0) {
        report.error("engine.maxTokens", "maxTokens must be >= 1");
    }
    if let Some(t) = engine.temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error("engine.temperature", "temperature must be between 0 and 2");
        }
    }
}

fn validate_logging(config: &LcForgeConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        let base = level.split(',').next().unwrap_or("").trim().to_lowercase();
        if !base.contains('=')
            && !matches!(base.as_str(), "trace" | "debug" | "info" | "warn" | "error" | "off")
        {
            report.warn("logging.level", format!("Unrecognised log level '{level}'"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_all_defaults;
    use crate::schema::{EngineConfig, OcrConfig, ServerConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&LcForgeConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn defaults_only_warn_about_missing_keys() {
        let report = validate(&apply_all_defaults(LcForgeConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.iter().any(|w| w.path == "ocr.ocrSpace.apiKey"));
        assert!(report.warnings.iter().any(|w| w.path == "engine.apiKey"));
    }

    #[test]
    fn bad_env_overrides_become_warnings() {
        let env: HashMap<String, String> = [
            ("LCFORGE_PORT", "not-a-port"),
            ("LCFORGE_ENGINE_PROVIDER", "azure"),
            ("LCFORGE_OCR_PROVIDER", "tesseract"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut report = validate(&LcForgeConfig::default());
        report.merge(validate_env_with(&env));
        assert!(report.is_valid());
        let paths: Vec<&str> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["LCFORGE_PORT", "LCFORGE_ENGINE_PROVIDER"]);
    }

    #[test]
    fn static_provider_needs_text() {
        let mut cfg = LcForgeConfig::default();
        cfg.ocr = Some(OcrConfig {
            provider: Some(OcrProviderKind::Static),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "ocr.staticText");
    }

    #[test]
    fn rejects_zero_port_and_bad_temperature() {
        let mut cfg = LcForgeConfig::default();
        cfg.server = Some(ServerConfig {
            port: Some(0),
            ..Default::default()
        });
        cfg.engine = Some(EngineConfig {
            provider: Some(EngineProviderKind::Ollama),
            temperature: Some(3.5),
            ..Default::default()
        });
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"server.port"));
        assert!(paths.contains(&"engine.temperature"));
    }
}
