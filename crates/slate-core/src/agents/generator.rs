//! Generation backend — invokes the text-generation service over HTTP.
//!
//! The `Generator` trait is the seam between the analysis agents and the
//! external model API, so tests can substitute scripted or failing backends.
//! The HTTP implementation talks to an Anthropic-compatible Messages API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Failure modes of a single generation call. These never escape the agent
/// layer: callers convert them into fallback results and error strings.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("Model output missing required structure: {0}")]
    Validation(String),
}

/// One external text-generation call.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, AgentError>;
}

/// Configuration for the Anthropic-compatible Messages API.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 4096,
        }
    }
}

impl GeneratorConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ANTHROPIC_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("ANTHROPIC_AUTH_TOKEN")
                .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
                .unwrap_or_default(),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or(defaults.model),
            max_tokens: defaults.max_tokens,
        }
    }
}

/// HTTP client for the Messages API.
///
/// POST {base_url}/v1/messages
/// Headers:
///   x-api-key: {api_key}
///   anthropic-version: 2023-06-01
///   content-type: application/json
pub struct HttpGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl HttpGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(GeneratorConfig::from_env())
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, AgentError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_prompt,
            }],
        };

        tracing::debug!(model = %self.config.model, "Calling generation API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(AgentError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&response_text).map_err(|e| AgentError::Parse(e.to_string()))?;

        let content = parsed
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(AgentError::Validation("empty text content".to_string()));
        }

        Ok(content)
    }
}

/// Pull a JSON object out of model output, tolerating code fences and
/// surrounding prose, and deserialize it.
pub fn parse_json_response<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, AgentError> {
    let trimmed = text.trim();

    let candidate = if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else {
        trimmed
    };

    let candidate = match (candidate.find('{'), candidate.rfind('}')) {
        (Some(open), Some(close)) if close > open => &candidate[open..=close],
        _ => {
            return Err(AgentError::Validation(
                "no JSON object in model output".to_string(),
            ))
        }
    };

    serde_json::from_str(candidate).map_err(|e| AgentError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_json_plain() {
        let parsed: HashMap<String, u32> = parse_json_response(r#"{"a": 1}"#).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn test_parse_json_fenced_with_prose() {
        let text = "Here is the breakdown:\n```json\n{\"a\": 2}\n```\nLet me know.";
        let parsed: HashMap<String, u32> = parse_json_response(text).unwrap();
        assert_eq!(parsed["a"], 2);
    }

    #[test]
    fn test_parse_json_missing_object() {
        let err = parse_json_response::<HashMap<String, u32>>("no json here").unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.base_url, "https://api.anthropic.com");
        assert!(config.max_tokens > 0);
    }
}
