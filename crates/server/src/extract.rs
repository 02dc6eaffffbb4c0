//! Uniform request-body validation: every route deserializes through the
//! same extractor, so a missing or malformed field is always a 400 with the
//! same envelope, never a per-route ad hoc check.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(format!("invalid JSON body: {e}")))?;
        let parsed = serde_json::from_value(value)
            .map_err(|e| ApiError::Validation(format!("invalid request body: {e}")))?;
        Ok(ValidJson(parsed))
    }
}
