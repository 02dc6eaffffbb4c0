//! Completion client for the AI provider backing the prompt flows.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
}

/// A single turn of a prompt conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}

/// Prompt-completion client. One attempt per call; the routes that use it
/// treat every failure as terminal for the current request.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(api_key: String, model: Option<String>) -> Result<Self, LlmError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, model)
    }

    pub fn with_base_url(
        base_url: String,
        api_key: String,
        model: Option<String>,
    ) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("chika-pos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Send a single prompt and return the completion text.
    pub async fn ask(&self, prompt: &str, system: Option<String>) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: system.map(|text| Content {
                role: "system".to_string(),
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: 4096,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let res = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let response = match res.status() {
            s if s.is_success() => res
                .json::<GenerateResponse>()
                .await
                .map_err(|e| LlmError::Serde(e.to_string()))?,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(LlmError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                return Err(LlmError::Http { status, body });
            }
        };

        response
            .text()
            .map(str::to_string)
            .ok_or_else(|| LlmError::Serde("no text content in response".to_string()))
    }

    /// Send a prompt expecting JSON in the completion.
    pub async fn ask_json<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
        system: Option<String>,
    ) -> Result<T, LlmError> {
        let response = self.ask(prompt, system).await?;

        let json_str = extract_json(&response);
        if json_str.trim().is_empty() {
            tracing::error!(response = %response, "failed to extract JSON from completion");
            return Err(LlmError::Serde("empty completion".to_string()));
        }

        serde_json::from_str(json_str).map_err(|e| {
            tracing::error!(
                json_error = %e,
                completion_preview = %json_str.chars().take(500).collect::<String>(),
                "failed to parse JSON completion"
            );
            LlmError::Serde(e.to_string())
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(e.to_string())
    }
}

/// Extract JSON from a completion that may wrap it in markdown code fences.
fn extract_json(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    match after.find("```") {
        Some(close) => after[..close].trim(),
        None => text,
    }
}
