//! Forwarder for the WhatsApp-sending webhook.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error)]
pub enum WhatsAppError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("webhook error: {message}")]
    Http { status: u16, message: String },
    #[error("json error: {0}")]
    Serde(String),
}

/// Sends one message per call to the configured webhook. Single attempt, no
/// retry; delivery guarantees are the webhook's problem.
#[derive(Debug, Clone)]
pub struct WhatsAppService {
    http: Client,
    webhook_url: Url,
}

impl WhatsAppService {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(webhook_url: Url) -> Result<Self, WhatsAppError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("chika-pos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WhatsAppError::Transport(e.to_string()))?;
        Ok(Self { http, webhook_url })
    }

    pub async fn send(&self, phone: &str, message: &str) -> Result<Value, WhatsAppError> {
        let res = self
            .http
            .post(self.webhook_url.clone())
            .json(&json!({ "phone": phone, "message": message }))
            .send()
            .await
            .map_err(|e| WhatsAppError::Transport(e.to_string()))?;

        match res.status() {
            s if s.is_success() => res
                .json::<Value>()
                .await
                .map_err(|e| WhatsAppError::Serde(e.to_string())),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.get("error")
                            .or_else(|| v.get("message"))
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| format!("webhook returned status {status}"));
                Err(WhatsAppError::Http { status, message })
            }
        }
    }
}
