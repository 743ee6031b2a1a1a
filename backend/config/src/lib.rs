//! `lcforge-config` — LcForge runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, OCR provider, engine, autofill, logging)
//! - YAML read/write with atomic replace
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Config redaction for safe logging/display
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, collect_referenced_vars, resolve_env_vars,
    resolve_env_vars_with, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{
    AutofillConfig, EngineConfig, EngineProviderKind, LcForgeConfig, LoggingConfig, OcrConfig,
    OcrProviderKind, OcrSpaceConfig, ServerConfig, TesseractConfig, TextractConfig, VisionConfig,
};
pub use validation::{
    validate, validate_env, validate_env_with, ConfigValidationError, ValidationReport,
};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load a config file and run it through substitution, overrides and defaults.
///
/// This is the main entry point for loading a config at runtime. It does not
/// validate; callers run [`validate`] once logging is up and hand the report
/// to [`log_report`].
pub async fn load_and_prepare(path: &Path) -> Result<LcForgeConfig> {
    let raw_config = load_config(path).await?;
    prepare_with(raw_config, &std::env::vars().collect())
}

/// Emit every validation finding through `tracing`.
pub fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}

/// Substitute `${VAR}`, apply env overrides, then defaults, using `env`.
pub fn prepare_with(config: LcForgeConfig, env: &HashMap<String, String>) -> Result<LcForgeConfig> {
    let value: Value =
        serde_json::to_value(&config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: LcForgeConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides_with(config, env);
    Ok(apply_all_defaults(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_resolves_and_defaults() {
        let yaml = r#"
ocr:
  provider: ocr_space
  ocrSpace:
    apiKey: ${OCR_KEY}
"#;
        let raw: LcForgeConfig = serde_yaml::from_str(yaml).unwrap();
        let env: HashMap<String, String> = [("OCR_KEY".to_string(), "K123".to_string())].into();
        let cfg = prepare_with(raw, &env).unwrap();

        let space = cfg.ocr().ocr_space.unwrap();
        assert_eq!(space.api_key.as_deref(), Some("K123"));
        assert_eq!(space.language.as_deref(), Some("eng"));
        assert_eq!(cfg.server().port, Some(defaults::DEFAULT_PORT));
    }

    #[test]
    fn prepare_fails_on_missing_reference() {
        let yaml = "engine:\n  apiKey: ${NOT_SET_ANYWHERE}\n";
        let raw: LcForgeConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(prepare_with(raw, &HashMap::new()).is_err());
    }
}
