use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lcforge_core::{LlmProvider, LlmRequest, LlmResponse};

/// Any endpoint speaking the OpenAI chat-completions protocol
/// (OpenAI itself, OpenRouter, self-hosted gateways).
pub struct OpenAiCompatProvider {
    name: String,
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into(),
        }
    }

    pub fn openai(api_key: Option<String>) -> Self {
        Self::new("openai", api_key, "https://api.openai.com/v1")
    }

    pub fn openrouter(api_key: Option<String>) -> Self {
        Self::new("openrouter", api_key, "https://openrouter.ai/api/v1")
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .with_context(|| format!("No API key configured for {}", self.name))?;
        let start = Instant::now();

        let mut messages = Vec::new();
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(request.system_prompt.clone()),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(request.user_prompt.clone()),
        });

        let body = ChatRequest {
            model: request.model.clone(),
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        debug!(provider = %self.name, model = %request.model, "Sending chat completion request");

        let mut http = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(api_key)
            .json(&body);
        if self.name == "openrouter" {
            http = http.header("X-Title", "LcForge");
        }

        let response = http
            .send()
            .await
            .with_context(|| format!("{} HTTP request failed", self.name))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", self.name, status, error_body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", self.name))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let tokens_used = chat_response
            .usage
            .and_then(|u| u.total_tokens)
            .unwrap_or(0);

        Ok(LlmResponse {
            content,
            provider: self.name.clone(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn request() -> LlmRequest {
        LlmRequest {
            model: "gpt-4".into(),
            system_prompt: "system".into(),
            user_prompt: "user".into(),
            max_tokens: 64,
            temperature: 0.0,
        }
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let provider = OpenAiCompatProvider::openai(None);
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }

    #[tokio::test]
    async fn sends_bearer_and_reads_first_choice() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                Json(json!({
                    "choices": [{ "message": { "role": "assistant",
                        "content": format!("{auth}|{}", body["messages"][0]["role"].as_str().unwrap_or("")) } }],
                    "usage": { "total_tokens": 42 }
                }))
            }),
        );
        let base = spawn(app).await;
        let provider = OpenAiCompatProvider::openai(Some("sk-test".into())).with_base_url(base);

        let response = provider.complete(&request()).await.unwrap();
        assert_eq!(response.content, "Bearer sk-test|system");
        assert_eq!(response.tokens_used, 42);
        assert_eq!(response.provider, "openai");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|_body: axum::body::Bytes| async {
                (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down")
            }),
        );
        let base = spawn(app).await;
        let provider = OpenAiCompatProvider::openrouter(Some("sk-or".into())).with_base_url(base);

        let err = provider.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("429"), "{err}");
    }
}
