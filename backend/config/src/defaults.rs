//! Config defaults: applies default values to parsed config.

use crate::schema::{
    AutofillConfig, EngineConfig, LcForgeConfig, LoggingConfig, OcrConfig, OcrProviderKind,
    OcrSpaceConfig, ServerConfig, TesseractConfig, VisionConfig,
};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

pub const DEFAULT_OCR_SPACE_ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_TESSERACT_BINARY: &str = "tesseract";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub const DEFAULT_ENGINE_MODEL: &str = "gpt-4";
pub const DEFAULT_ENGINE_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_ENGINE_TEMPERATURE: f32 = 0.0;

pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAP_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: LcForgeConfig) -> LcForgeConfig {
    let config = apply_server_defaults(config);
    let config = apply_ocr_defaults(config);
    let config = apply_engine_defaults(config);
    let config = apply_autofill_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: LcForgeConfig) -> LcForgeConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    server.session_ttl_secs.get_or_insert(DEFAULT_SESSION_TTL_SECS);
    config
}

/// Fill in only the settings block of the selected provider.
fn apply_ocr_defaults(mut config: LcForgeConfig) -> LcForgeConfig {
    let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
    let provider = *ocr.provider.get_or_insert(OcrProviderKind::default());
    match provider {
        OcrProviderKind::OcrSpace => {
            let space = ocr.ocr_space.get_or_insert_with(OcrSpaceConfig::default);
            space
                .endpoint
                .get_or_insert_with(|| DEFAULT_OCR_SPACE_ENDPOINT.to_string());
            space
                .language
                .get_or_insert_with(|| DEFAULT_OCR_LANGUAGE.to_string());
        }
        OcrProviderKind::Tesseract => {
            let tess = ocr.tesseract.get_or_insert_with(TesseractConfig::default);
            tess.binary
                .get_or_insert_with(|| DEFAULT_TESSERACT_BINARY.to_string());
            tess.language
                .get_or_insert_with(|| DEFAULT_OCR_LANGUAGE.to_string());
        }
        OcrProviderKind::Vision => {
            let vision = ocr.vision.get_or_insert_with(VisionConfig::default);
            vision
                .base_url
                .get_or_insert_with(|| DEFAULT_OPENAI_BASE_URL.to_string());
            vision
                .model
                .get_or_insert_with(|| DEFAULT_VISION_MODEL.to_string());
        }
        OcrProviderKind::Textract | OcrProviderKind::Static => {}
    }
    config
}

fn apply_engine_defaults(mut config: LcForgeConfig) -> LcForgeConfig {
    let engine = config.engine.get_or_insert_with(EngineConfig::default);
    let provider = *engine.provider.get_or_insert(Default::default());
    if engine.base_url.is_none() && !provider.default_base_url().is_empty() {
        engine.base_url = Some(provider.default_base_url().to_string());
    }
    engine
        .model
        .get_or_insert_with(|| DEFAULT_ENGINE_MODEL.to_string());
    engine.max_tokens.get_or_insert(DEFAULT_ENGINE_MAX_TOKENS);
    engine.temperature.get_or_insert(DEFAULT_ENGINE_TEMPERATURE);
    config
}

fn apply_autofill_defaults(mut config: LcForgeConfig) -> LcForgeConfig {
    let autofill = config.autofill.get_or_insert_with(AutofillConfig::default);
    autofill
        .extract_timeout_secs
        .get_or_insert(DEFAULT_EXTRACT_TIMEOUT_SECS);
    autofill.map_timeout_secs.get_or_insert(DEFAULT_MAP_TIMEOUT_SECS);
    autofill.include_current_fields.get_or_insert(true);
    config
}

fn apply_logging_defaults(mut config: LcForgeConfig) -> LcForgeConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EngineProviderKind;

    #[test]
    fn applies_server_port() {
        let cfg = apply_all_defaults(LcForgeConfig::default());
        assert_eq!(cfg.server.unwrap().port.unwrap(), DEFAULT_PORT);
    }

    #[test]
    fn fills_only_selected_ocr_provider() {
        let cfg = apply_all_defaults(LcForgeConfig::default());
        let ocr = cfg.ocr.unwrap();
        assert_eq!(
            ocr.ocr_space.unwrap().endpoint.unwrap(),
            DEFAULT_OCR_SPACE_ENDPOINT
        );
        assert!(ocr.tesseract.is_none());
    }

    #[test]
    fn engine_base_url_follows_provider() {
        let mut cfg = LcForgeConfig::default();
        cfg.engine = Some(EngineConfig {
            provider: Some(EngineProviderKind::Openrouter),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        assert_eq!(
            cfg.engine.unwrap().base_url.unwrap(),
            DEFAULT_OPENROUTER_BASE_URL
        );
    }

    #[test]
    fn does_not_override_user_set_port() {
        let mut cfg = LcForgeConfig::default();
        cfg.server = Some(ServerConfig {
            port: Some(9000),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.server.unwrap().port.unwrap(), 9000);
    }
}
