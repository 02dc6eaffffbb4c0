//! WhatsApp notification route: validates and forwards to the webhook.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::{ApiError, require_non_empty}, extract::ValidJson};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SendMessageRequest {
    pub phone: String,
    pub message: String,
}

impl SendMessageRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("phone", &self.phone)?;
        require_non_empty("message", &self.message)
    }
}

/// POST /api/whatsapp/send
pub async fn send_message(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SendMessageRequest>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    payload.validate()?;

    let whatsapp = state
        .whatsapp
        .as_ref()
        .ok_or(ApiError::Configuration("whatsapp webhook"))?;

    let response = whatsapp.send(&payload.phone, &payload.message).await?;
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/whatsapp/send", post(send_message))
}
