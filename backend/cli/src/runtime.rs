use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use lcforge_autofill::{AutofillSession, StageTimeouts};
use lcforge_config::{
    config_dir, config_file_path, load_and_prepare, log_report, validate, validate_env,
    LcForgeConfig, LoggingConfig, ValidationReport,
};
use lcforge_core::TextExtractor;
use lcforge_logging::{init_logger, LogOptions};
use lcforge_mapper::{mapper_from_config, FieldMapper};
use lcforge_understanding::extractor_from_config;
use tracing::info;

/// Loaded configuration plus where it came from.
pub struct Runtime {
    pub config: LcForgeConfig,
    pub path: PathBuf,
}

impl Runtime {
    /// Load the config, start logging, then report validation findings.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_file_path(&config_dir()));
        let config = load_and_prepare(&path).await?;

        init_logger(&log_options(&config.logging()));
        info!(path = %path.display(), exists = path.exists(), "Config loaded");
        log_report(&runtime_report(&config));

        Ok(Self { config, path })
    }

    pub async fn extractor(&self) -> Result<Arc<dyn TextExtractor>> {
        extractor_from_config(&self.config.ocr()).await
    }

    pub fn mapper(&self) -> Arc<FieldMapper> {
        Arc::new(mapper_from_config(&self.config))
    }

    pub fn timeouts(&self) -> StageTimeouts {
        StageTimeouts::from_config(&self.config.autofill())
    }

    /// A standalone session for one-shot CLI runs.
    pub async fn session(&self) -> Result<AutofillSession> {
        Ok(AutofillSession::new(
            self.extractor().await?,
            self.mapper(),
            self.timeouts(),
        ))
    }
}

/// Validation findings for the loaded config plus any rejected env overrides.
pub fn runtime_report(config: &LcForgeConfig) -> ValidationReport {
    let mut report = validate(config);
    report.merge(validate_env());
    report
}

pub fn log_options(logging: &LoggingConfig) -> LogOptions {
    LogOptions {
        level: logging.level_or_default(),
        json: logging.json.unwrap_or(false),
        dir: logging.dir.as_ref().map(PathBuf::from),
    }
}
