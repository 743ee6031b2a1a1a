//! Environment variable substitution and overrides for config values.
//!
//! `${VAR_NAME}` in any string value is resolved at load time. Only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched, and `$${VAR}` escapes to a literal
//! `${VAR}`.
//!
//! After substitution, a fixed set of well-known variables
//! (`OPENAI_API_KEY`, `LCFORGE_PORT`, ...) fill in or override settings.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::schema::{
    EngineConfig, EngineProviderKind, LcForgeConfig, LoggingConfig, OcrConfig, OcrProviderKind,
    OcrSpaceConfig, ServerConfig, VisionConfig,
};

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$)?\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var regex"));

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Fails if a referenced variable is unset
/// or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Collect all env var names referenced in a config value tree (for diagnostics).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in ENV_VAR_PATTERN.captures_iter(s) {
                if caps.get(1).is_none() {
                    out.push(caps[2].to_string());
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Well-known variable overrides
// ---------------------------------------------------------------------------

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: LcForgeConfig) -> LcForgeConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map.
///
/// `LCFORGE_*` variables replace file values. Provider API keys only fill in
/// keys the file leaves empty.
pub fn apply_env_overrides_with(
    mut config: LcForgeConfig,
    env: &HashMap<String, String>,
) -> LcForgeConfig {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(bind) = get("LCFORGE_BIND") {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.to_string());
    }
    // Unparseable values are skipped here and reported by `validate_env_with`.
    if let Some(Ok(port)) = get("LCFORGE_PORT").map(str::parse::<u16>) {
        config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
    }
    if let Some(Ok(kind)) = get("LCFORGE_OCR_PROVIDER").map(str::parse::<OcrProviderKind>) {
        config.ocr.get_or_insert_with(OcrConfig::default).provider = Some(kind);
    }
    if let Some(Ok(kind)) = get("LCFORGE_ENGINE_PROVIDER").map(str::parse::<EngineProviderKind>) {
        config.engine.get_or_insert_with(EngineConfig::default).provider = Some(kind);
    }
    if let Some(level) = get("LCFORGE_LOG") {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.to_string());
    }

    if let Some(key) = get("OCR_SPACE_API_KEY") {
        let space = config
            .ocr
            .get_or_insert_with(OcrConfig::default)
            .ocr_space
            .get_or_insert_with(OcrSpaceConfig::default);
        fill_missing(&mut space.api_key, key, "ocr.ocrSpace.apiKey");
    }

    if let Some(key) = get("OPENAI_API_KEY") {
        let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
        if ocr.provider_or_default() == OcrProviderKind::Vision {
            let vision = ocr.vision.get_or_insert_with(VisionConfig::default);
            fill_missing(&mut vision.api_key, key, "ocr.vision.apiKey");
        }
    }

    let engine = config.engine.get_or_insert_with(EngineConfig::default);
    let key_var = match engine.provider_or_default() {
        EngineProviderKind::Openai => Some("OPENAI_API_KEY"),
        EngineProviderKind::Openrouter => Some("OPENROUTER_API_KEY"),
        EngineProviderKind::Ollama | EngineProviderKind::Mock => None,
    };
    if let Some(key) = key_var.and_then(get) {
        fill_missing(&mut engine.api_key, key, "engine.apiKey");
    }

    config
}

fn fill_missing(slot: &mut Option<String>, value: &str, path: &str) {
    if slot.as_deref().map_or(true, str::is_empty) {
        debug!(path, "Filled from environment");
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"apiKey": "${OPENAI_API_KEY}"});
        let env = env(&[("OPENAI_API_KEY", "sk-abc123")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["apiKey"], "sk-abc123");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"engine": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("MISSING_VAR"));
        assert!(err.to_string().contains("engine.apiKey"));
    }

    #[test]
    fn escaped_reference_stays_literal() {
        let v = json!({"note": "$${HOME} and ${USER_NAME}"});
        let env = env(&[("USER_NAME", "ada")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["note"], "${HOME} and ada");
    }

    #[test]
    fn collects_referenced_vars() {
        let v = json!({"a": "${FOO}", "b": {"c": "${BAR} $${SKIP}"}});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }

    #[test]
    fn overrides_port_and_fills_engine_key() {
        let env = env(&[("LCFORGE_PORT", "8080"), ("OPENAI_API_KEY", "sk-env")]);
        let cfg = apply_env_overrides_with(LcForgeConfig::default(), &env);
        assert_eq!(cfg.server().port, Some(8080));
        assert_eq!(cfg.engine().api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn file_api_key_wins_over_env() {
        let mut cfg = LcForgeConfig::default();
        cfg.engine = Some(EngineConfig {
            api_key: Some("sk-file".into()),
            ..Default::default()
        });
        let cfg = apply_env_overrides_with(cfg, &env(&[("OPENAI_API_KEY", "sk-env")]));
        assert_eq!(cfg.engine().api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn openrouter_reads_its_own_key() {
        let env = env(&[
            ("LCFORGE_ENGINE_PROVIDER", "openrouter"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENROUTER_API_KEY", "sk-or"),
        ]);
        let cfg = apply_env_overrides_with(LcForgeConfig::default(), &env);
        assert_eq!(cfg.engine().api_key.as_deref(), Some("sk-or"));
    }

    #[test]
    fn invalid_port_is_ignored() {
        let cfg = apply_env_overrides_with(
            LcForgeConfig::default(),
            &env(&[("LCFORGE_PORT", "not-a-port")]),
        );
        assert!(cfg.server.is_none());
    }
}
