//! Credential lookup for the current server-side session.

use chrono::Utc;
use db::models::session::Session;
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Resolves the bearer token of the session named by the `x-session-id`
/// request header. Every failure mode yields `None`: callers must treat a
/// missing credential as "proceed unauthenticated", not as an error.
#[derive(Clone)]
pub struct SessionService {
    pool: SqlitePool,
}

impl SessionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn access_token(&self, session_id: Option<&str>) -> Option<String> {
        let session_id = session_id?;

        let session = match Session::find_by_id(&self.pool, session_id).await {
            Ok(session) => session?,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "session lookup failed, proceeding unauthenticated");
                return None;
            }
        };

        if session.is_expired(Utc::now()) {
            debug!(session_id = %session_id, "session expired, proceeding unauthenticated");
            return None;
        }

        Some(session.access_token)
    }
}
