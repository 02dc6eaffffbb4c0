//! Top-up route: opens a hosted-checkout session at the payment gateway.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use serde::{Deserialize, Serialize};
use services::services::payments::{TopUpInput, TopUpSession};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::{ApiError, require_non_empty}, extract::ValidJson};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TopUpRequest {
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: Option<String>,
    /// Optional deduplication key; a retry with the same key returns the
    /// originally created session.
    pub idempotency_key: Option<String>,
}

impl TopUpRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.amount <= 0 {
            return Err(ApiError::Validation(
                "amount must be a positive amount".to_string(),
            ));
        }
        require_non_empty("customerName", &self.customer_name)
    }
}

/// POST /api/payments/top-up
pub async fn create_top_up(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<TopUpRequest>,
) -> Result<ResponseJson<ApiResponse<TopUpSession>>, ApiError> {
    payload.validate()?;

    let payments = state
        .payments
        .as_ref()
        .ok_or(ApiError::Configuration("payment gateway"))?;

    let session = payments
        .create_top_up(&TopUpInput {
            amount: payload.amount,
            customer_name: payload.customer_name,
            customer_email: payload.customer_email,
            idempotency_key: payload.idempotency_key,
        })
        .await?;

    Ok(ResponseJson(ApiResponse::success(session)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/payments/top-up", post(create_top_up))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::{self, test_utils};

    #[tokio::test]
    async fn invalid_amount_is_rejected_before_the_gateway_matters() {
        // No gateway configured: validation still answers first.
        let state = test_utils::test_state().await;
        let app = routes::router(state);

        let (status, body) = test_utils::send(
            app,
            "POST",
            "/api/payments/top-up",
            Some(json!({"amount": -500, "customerName": "Budi"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "amount must be a positive amount");
    }

    #[tokio::test]
    async fn valid_request_without_gateway_is_a_generic_500() {
        let state = test_utils::test_state().await;
        let app = routes::router(state);

        let (status, body) = test_utils::send(
            app,
            "POST",
            "/api/payments/top-up",
            Some(json!({"amount": 50000, "customerName": "Budi"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
    }
}
