/// Model backend boundary — the single point of entry for all generative
/// model calls in the service.
///
/// ARCHITECTURAL RULE: no other module may call a provider API directly.
/// Everything goes through the [`TextGenerator`] capability, constructed
/// eagerly at startup from configuration so that a missing credential or an
/// unknown provider fails the boot, not a request.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use crate::config::Config;
use self::prompts::CV_ANALYST_SYSTEM;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 3;
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("model returned empty content")]
    EmptyContent,
}

/// Abstract capability over a generative-text backend: prompt in, raw reply
/// text out. The reply is untrusted; coercion happens downstream.
#[async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Selects and eagerly constructs the configured model backend.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    match config.ai_provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY is required when AI_PROVIDER=openai")?;
            Ok(Arc::new(OpenAiClient::new(
                api_key,
                config.openai_model.clone(),
            )))
        }
        "gemini" => {
            let api_key = config
                .gemini_api_key
                .clone()
                .context("GEMINI_API_KEY is required when AI_PROVIDER=gemini")?;
            Ok(Arc::new(GeminiClient::new(
                api_key,
                config.gemini_model.clone(),
            )))
        }
        other => bail!("unsupported AI provider: {other}"),
    }
}

fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client")
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Sends a request with retries on 429 and 5xx, using exponential backoff
/// (1s, 2s, 4s). Non-retryable API errors surface the provider's message.
async fn send_with_retries<F>(make_request: F) -> Result<reqwest::Response, LlmError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "model call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match make_request().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("model API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI chat-completions backend. Requests JSON-object output directly so
/// the coercer rarely has to dig the JSON out of prose.
#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: http_client(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = OpenAiRequest {
            model: &self.model,
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: CV_ANALYST_SYSTEM,
                },
                OpenAiMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
        };

        let response = send_with_retries(|| {
            self.client
                .post(OPENAI_API_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;

        let parsed: OpenAiResponse = response.json().await?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

/// Google Gemini generateContent backend.
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: http_client(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = send_with_retries(|| {
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body)
        })
        .await?;

        let parsed: GeminiResponse = response.json().await?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .find_map(|part| part.text)
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(provider: &str, openai_key: Option<&str>, gemini_key: Option<&str>) -> Config {
        Config {
            ai_provider: provider.to_string(),
            openai_api_key: openai_key.map(str::to_string),
            openai_model: "gpt-4o-mini".to_string(),
            gemini_api_key: gemini_key.map(str::to_string),
            gemini_model: "gemini-1.5-flash".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            max_file_size: 10 * 1024 * 1024,
            allowed_extensions: vec![".pdf".to_string()],
        }
    }

    #[test]
    fn test_build_generator_openai_requires_key() {
        assert!(build_generator(&config_with("openai", None, None)).is_err());
        assert!(build_generator(&config_with("openai", Some("sk-test"), None)).is_ok());
    }

    #[test]
    fn test_build_generator_gemini_requires_key() {
        assert!(build_generator(&config_with("gemini", None, None)).is_err());
        assert!(build_generator(&config_with("gemini", None, Some("g-test"))).is_ok());
    }

    #[test]
    fn test_build_generator_provider_is_case_insensitive() {
        assert!(build_generator(&config_with("OpenAI", Some("sk-test"), None)).is_ok());
    }

    #[test]
    fn test_build_generator_rejects_unknown_provider() {
        let err = build_generator(&config_with("bard", None, None)).unwrap_err();
        assert!(err.to_string().contains("unsupported AI provider"));
    }
}
