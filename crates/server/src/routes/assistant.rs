//! Conversational assistant route: validates the payload, attaches the
//! session credential and forwards to the `chika-ai` managed function.

use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ts_rs::TS;

use crate::{AppState, error::{ApiError, require_non_empty}, extract::ValidJson};

pub const SESSION_HEADER: &str = "x-session-id";

/// One prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Required fields of the assistant route. An empty history is a valid first
/// turn; an empty `userInput` is not.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub conversation_history: Vec<ChatTurn>,
    pub user_input: String,
}

impl AssistantRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("userInput", &self.user_input)
    }
}

/// POST /api/assistant
///
/// On success the remote function's JSON response is returned verbatim.
pub async fn ask_assistant(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(payload): ValidJson<AssistantRequest>,
) -> Result<ResponseJson<Value>, ApiError> {
    payload.validate()?;

    let client = state
        .functions
        .as_ref()
        .ok_or(ApiError::Configuration("managed functions backend"))?;

    // A missing credential is non-fatal: the call proceeds unauthenticated.
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok());
    let token = state.sessions.access_token(session_id).await;
    if token.is_none() {
        debug!("no session credential, forwarding unauthenticated");
    }

    let body = serde_json::to_value(&payload)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let response = client.invoke("chika-ai", token.as_deref(), &body).await?;

    Ok(ResponseJson(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/assistant", post(ask_assistant))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        Json, Router as AxumRouter,
        body::Body,
        extract::State,
        http::{HeaderMap, Request, StatusCode},
        routing::post as upstream_post,
    };
    use db::models::session::Session;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::routes::{self, test_utils};

    /// Fake managed-functions backend: counts hits, echoes the body and the
    /// Authorization header.
    async fn spawn_upstream(hits: Arc<AtomicUsize>, status: StatusCode) -> Url {
        let app = AxumRouter::new()
            .route(
                "/functions/v1/{function}",
                upstream_post(
                    move |State(hits): State<Arc<AtomicUsize>>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        if status.is_success() {
                            (status, Json(json!({ "echo": body, "auth": auth })))
                        } else {
                            (status, Json(json!({ "error": "function exploded" })))
                        }
                    },
                ),
            )
            .with_state(hits);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn missing_required_field_is_400_with_no_upstream_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(hits.clone(), StatusCode::OK).await;
        let state = test_utils::test_state_with_functions(base).await;
        let app = routes::router(state);

        // Field absent entirely.
        let (status, body) = test_utils::send(
            app.clone(),
            "POST",
            "/api/assistant",
            Some(json!({"conversationHistory": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        // Field present but empty.
        let (status, _) = test_utils::send(
            app,
            "POST",
            "/api/assistant",
            Some(json!({"conversationHistory": [], "userInput": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_request_is_forwarded_exactly_once_and_verbatim() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(hits.clone(), StatusCode::OK).await;
        let state = test_utils::test_state_with_functions(base).await;
        let app = routes::router(state);

        let payload = json!({
            "conversationHistory": [{"role": "user", "content": "halo"}],
            "userInput": "ada promo apa?",
        });
        let (status, body) =
            test_utils::send(app, "POST", "/api/assistant", Some(payload.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(body["echo"], payload);
        // No session header: forwarded unauthenticated.
        assert_eq!(body["auth"], Value::Null);
    }

    #[tokio::test]
    async fn session_credential_is_attached_as_bearer() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(hits.clone(), StatusCode::OK).await;
        let state = test_utils::test_state_with_functions(base).await;
        Session::create(&state.db.pool, "sid-1", "tok-abc", None)
            .await
            .unwrap();
        let app = routes::router(state);

        let payload = json!({"conversationHistory": [], "userInput": "halo"});
        let request = Request::builder()
            .method("POST")
            .uri("/api/assistant")
            .header("content-type", "application/json")
            .header(SESSION_HEADER, "sid-1")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["auth"], "Bearer tok-abc");
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_500_with_upstream_message() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(hits.clone(), StatusCode::BAD_GATEWAY).await;
        let state = test_utils::test_state_with_functions(base).await;
        let app = routes::router(state);

        let (status, body) = test_utils::send(
            app,
            "POST",
            "/api/assistant",
            Some(json!({"conversationHistory": [], "userInput": "halo"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "function exploded");
        assert_eq!(body.get("error_messages"), None);
    }

    #[tokio::test]
    async fn unconfigured_backend_is_a_generic_500() {
        let state = test_utils::test_state().await;
        let app = routes::router(state);

        let (status, body) = test_utils::send(
            app,
            "POST",
            "/api/assistant",
            Some(json!({"conversationHistory": [], "userInput": "halo"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
    }
}
