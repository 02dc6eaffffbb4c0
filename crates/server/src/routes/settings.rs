//! Settings routes: read the effective record, overlay admin edits.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::setting::SettingsKey;
use serde_json::Value;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, extract::ValidJson};

/// GET /api/settings/{key}
///
/// Always answers 200: an absent row or a failing lookup yields the
/// compiled-in default, so rendering is never blocked on the store.
pub async fn get_settings(
    State(state): State<AppState>,
    Path(key): Path<SettingsKey>,
) -> ResponseJson<ApiResponse<Value>> {
    let value = state.settings.effective(key).await;
    ResponseJson(ApiResponse::success(value))
}

/// PUT /api/settings/{key}
///
/// The body is a partial record; stored fields are replaced field-by-field
/// and the full merged record is returned.
pub async fn update_settings(
    State(state): State<AppState>,
    Path(key): Path<SettingsKey>,
    ValidJson(patch): ValidJson<Value>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let merged = state.settings.update(key, &patch).await?;
    Ok(ResponseJson(ApiResponse::success(merged)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings/{key}", get(get_settings).put(update_settings))
}
