use std::sync::Arc;

use lcforge_config::{AutofillConfig, EngineConfig};
use lcforge_core::{
    token_count, AutofillError, FieldRecord, LlmProvider, LlmRequest, PartialRecord, MIN_TOKENS,
};
use lcforge_logging::redact_sensitive_data;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::directive::build_directive;
use crate::reply::{classify, Classified, ParseTier};

/// What a mapping run concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MappingOutcome {
    Success { partial: PartialRecord, tier: ParseTier },
    /// The engine answered with nothing usable at all.
    Unparseable { reply: String },
    ExplicitFailure,
    InsufficientText { tokens: usize },
}

/// Engine call metadata, present whenever the engine was invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineCall {
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
    pub tokens_used: u64,
}

/// One mapping run over a piece of raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionAttempt {
    pub raw_text: String,
    pub reply: Option<String>,
    pub outcome: MappingOutcome,
    pub engine: Option<EngineCall>,
}

impl ExtractionAttempt {
    /// Fields recovered by a successful run.
    pub fn partial(&self) -> Option<&PartialRecord> {
        match &self.outcome {
            MappingOutcome::Success { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// The failure this outcome stands for, if any.
    pub fn failure(&self) -> Option<AutofillError> {
        match &self.outcome {
            MappingOutcome::Success { .. } => None,
            MappingOutcome::Unparseable { .. } => Some(AutofillError::Unparseable),
            MappingOutcome::ExplicitFailure => Some(AutofillError::ExplicitFailure),
            MappingOutcome::InsufficientText { tokens } => Some(AutofillError::InsufficientText {
                tokens: *tokens,
                minimum: MIN_TOKENS,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapperSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Send populated form values along as context.
    pub include_current_fields: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            include_current_fields: true,
        }
    }
}

impl MapperSettings {
    pub fn from_config(engine: &EngineConfig, autofill: &AutofillConfig) -> Self {
        Self {
            model: engine.model_or_default(),
            max_tokens: engine.max_tokens_or_default(),
            temperature: engine.temperature_or_default(),
            include_current_fields: autofill.include_current_fields_or_default(),
        }
    }
}

/// Turns raw OCR text into a partial field record via the engine.
pub struct FieldMapper {
    provider: Arc<dyn LlmProvider>,
    settings: MapperSettings,
}

impl FieldMapper {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: MapperSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub async fn map(
        &self,
        raw_text: &str,
        current: Option<&FieldRecord>,
    ) -> Result<ExtractionAttempt, AutofillError> {
        self.map_with_instructions(raw_text, current, None).await
    }

    /// Map `raw_text`, appending `instructions` to the directive.
    ///
    /// Text under the token minimum never reaches the engine. An engine
    /// transport failure is an error; every reply, however odd, is an attempt.
    pub async fn map_with_instructions(
        &self,
        raw_text: &str,
        current: Option<&FieldRecord>,
        instructions: Option<&str>,
    ) -> Result<ExtractionAttempt, AutofillError> {
        let tokens = token_count(raw_text);
        if tokens < MIN_TOKENS {
            info!(tokens, minimum = MIN_TOKENS, "Not enough text to map; engine skipped");
            return Ok(ExtractionAttempt {
                raw_text: raw_text.to_string(),
                reply: None,
                outcome: MappingOutcome::InsufficientText { tokens },
                engine: None,
            });
        }

        let context = current.filter(|_| self.settings.include_current_fields);
        let directive = build_directive(raw_text, context, instructions);
        let request = LlmRequest {
            model: self.settings.model.clone(),
            system_prompt: directive.system_prompt,
            user_prompt: directive.user_prompt,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        debug!(provider = %self.provider.name(), model = %request.model, tokens, "Mapping text");
        let response = self.provider.complete(&request).await.map_err(|e| {
            let message = redact_sensitive_data(&format!("{e:#}"));
            warn!(provider = %self.provider.name(), error = %message, "Engine call failed");
            AutofillError::Engine {
                provider: self.provider.name().to_string(),
                message,
            }
        })?;

        let outcome = match classify(&response.content) {
            Classified::Blank => MappingOutcome::Unparseable {
                reply: response.content.clone(),
            },
            Classified::ExplicitFailure => MappingOutcome::ExplicitFailure,
            Classified::Fields { partial, tier } => MappingOutcome::Success { partial, tier },
        };

        match &outcome {
            MappingOutcome::Success { partial, tier } => info!(
                provider = %response.provider,
                latency_ms = response.latency_ms,
                fields = partial.len(),
                tier = ?tier,
                "Engine reply mapped"
            ),
            other => info!(provider = %response.provider, outcome = ?other, "Engine reply not usable"),
        }

        Ok(ExtractionAttempt {
            raw_text: raw_text.to_string(),
            engine: Some(EngineCall {
                provider: response.provider,
                model: response.model,
                latency_ms: response.latency_ms,
                tokens_used: response.tokens_used,
            }),
            reply: Some(response.content),
            outcome,
        })
    }
}
