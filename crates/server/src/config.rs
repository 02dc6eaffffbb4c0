//! Process configuration, read once at startup. A missing variable disables
//! only the routes that need it; the rest of the process keeps serving.

use tracing::warn;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base URL of the managed-functions backend.
    pub functions_base_url: Option<Url>,
    /// Payment gateway credentials.
    pub payment_base_url: Option<Url>,
    pub payment_server_key: Option<String>,
    /// AI provider.
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    /// WhatsApp-sending webhook.
    pub whatsapp_webhook_url: Option<Url>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://chika-pos.db".to_string()),
            functions_base_url: optional_url("FUNCTIONS_BASE_URL"),
            payment_base_url: optional_url("PAYMENT_BASE_URL"),
            payment_server_key: optional_var("PAYMENT_SERVER_KEY"),
            llm_api_key: optional_var("LLM_API_KEY"),
            llm_model: optional_var("LLM_MODEL"),
            whatsapp_webhook_url: optional_url("WHATSAPP_WEBHOOK_URL"),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            warn!(var = name, "environment variable not set, dependent routes disabled");
            None
        }
    }
}

fn optional_url(name: &str) -> Option<Url> {
    let raw = optional_var(name)?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(var = name, error = %e, "environment variable is not a valid URL, dependent routes disabled");
            None
        }
    }
}
