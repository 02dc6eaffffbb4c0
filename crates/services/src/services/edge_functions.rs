//! Client for invoking remote managed functions (the hosted backend that owns
//! loyalty math, promotions and the conversational assistant).

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error)]
pub enum EdgeFunctionError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("remote function error: {message}")]
    Http { status: u16, message: String },
    #[error("json error: {0}")]
    Serde(String),
}

/// Invokes one named function per call. Each call is a single attempt with no
/// retry and no idempotency key; the caller decides what a failure means.
#[derive(Debug, Clone)]
pub struct EdgeFunctionClient {
    http: Client,
    base_url: Url,
}

impl EdgeFunctionClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(base_url: Url) -> Result<Self, EdgeFunctionError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("chika-pos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EdgeFunctionError::Transport(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// POST `body` to `{base_url}/functions/v1/{function}`, attaching the
    /// bearer credential when one is available. A missing credential means
    /// the call proceeds unauthenticated.
    pub async fn invoke(
        &self,
        function: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<Value, EdgeFunctionError> {
        let url = self
            .base_url
            .join(&format!("functions/v1/{function}"))
            .map_err(|e| EdgeFunctionError::Transport(e.to_string()))?;

        let mut request = self.http.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let res = request.send().await.map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<Value>()
                .await
                .map_err(|e| EdgeFunctionError::Serde(e.to_string())),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(EdgeFunctionError::Http {
                    status,
                    message: upstream_message(&body, status),
                })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> EdgeFunctionError {
    if e.is_timeout() {
        EdgeFunctionError::Timeout
    } else {
        EdgeFunctionError::Transport(e.to_string())
    }
}

/// Pull a human-readable message out of an upstream error body. The raw
/// payload is never surfaced to the caller.
fn upstream_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("remote function returned status {status}"))
}
