//! Route-boundary error taxonomy. Everything a handler can fail with maps to
//! one of four client-facing outcomes; upstream detail is logged server-side
//! and never leaked except for the upstream-supplied message itself.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    ai::AiServiceError, edge_functions::EdgeFunctionError, llm::LlmError, payments::PaymentError,
    settings::SettingsError, whatsapp::WhatsAppError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Inbound payload missing or empty required fields. Always 400.
    #[error("{0}")]
    Validation(String),
    /// Required external endpoint/secret absent. 500, generic message.
    #[error("{0} is not configured")]
    Configuration(&'static str),
    /// Remote call returned non-success; carries the upstream message.
    #[error("{0}")]
    Upstream(String),
    /// Anything else. 500, generic message, detail logged.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) | ApiError::Upstream(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message shown to the client. Internal and configuration failures
    /// get a generic one.
    fn client_message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::Upstream(msg) => msg.clone(),
            ApiError::Configuration(_) | ApiError::Internal(_) => {
                "internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(_) => {}
            other => error!(error = %other, "request failed"),
        }
        (
            self.status(),
            Json(ApiResponse::<()>::error(self.client_message())),
        )
            .into_response()
    }
}

impl From<EdgeFunctionError> for ApiError {
    fn from(e: EdgeFunctionError) -> Self {
        match e {
            EdgeFunctionError::Http { message, .. } => ApiError::Upstream(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<AiServiceError> for ApiError {
    fn from(e: AiServiceError) -> Self {
        match e {
            AiServiceError::Llm(llm) => llm.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Gateway { message, .. } => ApiError::Upstream(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WhatsAppError> for ApiError {
    fn from(e: WhatsAppError) -> Self {
        match e {
            WhatsAppError::Http { message, .. } => ApiError::Upstream(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::NotAnObject => ApiError::Validation(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Validation helper for required non-empty string fields.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::Validation(format!(
            "missing required field: {field}"
        )))
    } else {
        Ok(())
    }
}
