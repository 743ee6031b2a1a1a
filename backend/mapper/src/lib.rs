//! Field Mapper: raw OCR text in, partial field record out.

pub mod directive;
pub mod fallback;
pub mod mapper;
pub mod providers;
pub mod reply;

pub use directive::{build_directive, Directive, FAILURE_TOKEN};
pub use fallback::labeled_fallback;
pub use mapper::{EngineCall, ExtractionAttempt, FieldMapper, MapperSettings, MappingOutcome};
pub use providers::{engine_from_config, MockProvider, OllamaProvider, OpenAiCompatProvider};
pub use reply::{classify, Classified, ParseTier};

use lcforge_config::LcForgeConfig;

/// Build the mapper described by the config.
pub fn mapper_from_config(config: &LcForgeConfig) -> FieldMapper {
    let engine = config.engine();
    FieldMapper::new(
        engine_from_config(&engine),
        MapperSettings::from_config(&engine, &config.autofill()),
    )
}
