use std::time::{Duration, Instant};
use async_trait::async_trait;
use serde::Serialize;
use reqwest::Client;
use crate::config::Config;
use crate::error::{Result, AppError};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 2000;

/// A text-completion capability: one system + one user message in, one
/// completion out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

/// OpenRouter chat-completions client.
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.openrouter_api_key.clone(),
            &config.openrouter_base_url,
            &config.llm_model,
            config.llm_timeout,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::UpstreamFailure("OPENROUTER_API_KEY not configured".to_string())
        })?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let started = Instant::now();
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(AppError::UpstreamFailure(format!(
                "LLM provider returned status {}: {}",
                status,
                crate::article::truncate_chars(&detail, 200)
            )));
        }

        let json: serde_json::Value = res.json().await.map_err(|e| {
            AppError::UpstreamFailure(format!("Unreadable completion body: {}", e))
        })?;
        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AppError::UpstreamFailure("Invalid response format from LLM".to_string())
            })?
            .to_string();
        if reply.trim().is_empty() {
            return Err(AppError::UpstreamFailure(
                "LLM returned an empty completion".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = reply.chars().count(),
            "completion received"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let client = OpenRouterClient::new(
            None,
            "http://127.0.0.1:9",
            "test-model",
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.complete("system", "user").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::UpstreamFailure(msg) if msg.contains("OPENROUTER_API_KEY")
        ));
    }

    #[test]
    fn request_carries_sampling_bounds() {
        let body = ChatRequest {
            model: "m",
            messages: vec![Message { role: "user", content: "hi" }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 2000);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
