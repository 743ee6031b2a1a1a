use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lcforge_core::{LlmProvider, LlmRequest, LlmResponse};

/// Ollama local LLM provider.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    eval_count: Option<u64>,
    prompt_eval_count: Option<u64>,
}

/// Ollama tags carry no provider prefix: "openai/llama3" → "llama3".
fn local_model_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();
        let model = local_model_name(&request.model);

        let body = GenerateRequest {
            model,
            system: &request.system_prompt,
            prompt: &request.user_prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        debug!(model = %model, "Sending request to Ollama");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await
            .context("Ollama HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {}: {}", status, error_body);
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(LlmResponse {
            content: generated.response,
            provider: "ollama".to_string(),
            model: model.to_string(),
            tokens_used: generated.eval_count.unwrap_or(0)
                + generated.prompt_eval_count.unwrap_or(0),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn strips_provider_prefix() {
        assert_eq!(local_model_name("openai/llama3"), "llama3");
        assert_eq!(local_model_name("mistral"), "mistral");
    }

    #[tokio::test]
    async fn posts_generate_request() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], false);
                Json(json!({
                    "response": format!("model={}", body["model"].as_str().unwrap_or("")),
                    "eval_count": 7,
                    "prompt_eval_count": 3
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let provider = OllamaProvider::new().with_base_url(format!("http://{addr}"));
        let response = provider
            .complete(&LlmRequest {
                model: "library/llama3".into(),
                system_prompt: "sys".into(),
                user_prompt: "hi".into(),
                max_tokens: 32,
                temperature: 0.0,
            })
            .await
            .unwrap();
        assert_eq!(response.content, "model=llama3");
        assert_eq!(response.tokens_used, 10);
    }
}
