//! Routes for the AI prompt flows (discount suggestions, recommendations).

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use db::models::setting::{PointValueSettings, SettingsKey};
use serde::{Deserialize, Serialize};
use services::services::ai::{DiscountInput, DiscountSuggestion, PurchaseLine, Recommendations};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, extract::ValidJson};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    pub cart_total: i64,
    pub member_points: i64,
}

impl DiscountRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.cart_total <= 0 {
            return Err(ApiError::Validation(
                "cartTotal must be a positive amount".to_string(),
            ));
        }
        if self.member_points < 0 {
            return Err(ApiError::Validation(
                "memberPoints must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    pub purchase_history: Vec<PurchaseLine>,
}

impl RecommendationsRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.purchase_history.is_empty() {
            return Err(ApiError::Validation(
                "missing required field: purchaseHistory".to_string(),
            ));
        }
        Ok(())
    }
}

/// POST /api/ai/discount
///
/// The point value comes from the settings store, not the client.
pub async fn suggest_discount(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<DiscountRequest>,
) -> Result<ResponseJson<ApiResponse<DiscountSuggestion>>, ApiError> {
    payload.validate()?;

    let ai = state.ai.as_ref().ok_or(ApiError::Configuration("ai provider"))?;
    let point_value: PointValueSettings =
        state.settings.effective_as(SettingsKey::PointValue).await;

    let suggestion = ai
        .compute_discount(&DiscountInput {
            cart_total: payload.cart_total,
            member_points: payload.member_points,
            point_value_in_rp: point_value.point_value_in_rp,
        })
        .await?;

    Ok(ResponseJson(ApiResponse::success(suggestion)))
}

/// POST /api/ai/recommendations
pub async fn recommend_products(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RecommendationsRequest>,
) -> Result<ResponseJson<ApiResponse<Recommendations>>, ApiError> {
    payload.validate()?;

    let ai = state.ai.as_ref().ok_or(ApiError::Configuration("ai provider"))?;
    let recommendations = ai.recommend_products(&payload.purchase_history).await?;

    Ok(ResponseJson(ApiResponse::success(recommendations)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/ai",
        Router::new()
            .route("/discount", post(suggest_discount))
            .route("/recommendations", post(recommend_products)),
    )
}
