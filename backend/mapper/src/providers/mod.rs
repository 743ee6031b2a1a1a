pub mod mock;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use lcforge_config::{EngineConfig, EngineProviderKind};
use lcforge_core::LlmProvider;
use tracing::info;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatProvider;

/// Build the configured engine provider.
///
/// A missing API key is not an error here; the provider reports it per call,
/// so the server can still start and serve the other routes.
pub fn engine_from_config(config: &EngineConfig) -> Arc<dyn LlmProvider> {
    let kind = config.provider_or_default();
    let base_url = config.base_url_or_default();
    info!(provider = %kind, base_url = %base_url, "Initializing field-mapping engine");

    match kind {
        EngineProviderKind::Openai => Arc::new(
            OpenAiCompatProvider::openai(config.api_key.clone()).with_base_url(base_url),
        ),
        EngineProviderKind::Openrouter => Arc::new(
            OpenAiCompatProvider::openrouter(config.api_key.clone()).with_base_url(base_url),
        ),
        EngineProviderKind::Ollama => Arc::new(OllamaProvider::new().with_base_url(base_url)),
        EngineProviderKind::Mock => {
            let mut mock = MockProvider::new("mock");
            if let Some(reply) = &config.mock_reply {
                mock = mock.with_response(reply.clone());
            }
            Arc::new(mock)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_provider_kind() {
        for (kind, name) in [
            (EngineProviderKind::Openai, "openai"),
            (EngineProviderKind::Openrouter, "openrouter"),
            (EngineProviderKind::Ollama, "ollama"),
            (EngineProviderKind::Mock, "mock"),
        ] {
            let config = EngineConfig {
                provider: Some(kind),
                ..Default::default()
            };
            assert_eq!(engine_from_config(&config).name(), name);
        }
    }
}
