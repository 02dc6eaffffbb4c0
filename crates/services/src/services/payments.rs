//! Top-up checkout sessions at the hosted payment gateway.

use std::time::Duration;

use db::models::payment_order::{CreatePaymentOrder, PaymentOrder};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("network error: {0}")]
    Transport(String),
    #[error("payment gateway error: {message}")]
    Gateway { status: u16, message: String },
    #[error("json error: {0}")]
    Serde(String),
}

/// Fields of a top-up request after route validation.
#[derive(Debug, Clone)]
pub struct TopUpInput {
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub idempotency_key: Option<String>,
}

/// A hosted-checkout session the client can redirect the customer to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TopUpSession {
    pub order_id: String,
    pub token: String,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    token: String,
    redirect_url: Option<String>,
}

/// Creates checkout sessions. A caller-supplied idempotency key is
/// deduplicated against the `payment_orders` table, so a client retry of the
/// same logical intent returns the original session instead of opening a
/// second one.
#[derive(Clone)]
pub struct PaymentService {
    http: Client,
    base_url: Url,
    server_key: String,
    pool: SqlitePool,
}

impl PaymentService {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(base_url: Url, server_key: String, pool: SqlitePool) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("chika-pos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            server_key,
            pool,
        })
    }

    pub async fn create_top_up(&self, input: &TopUpInput) -> Result<TopUpSession, PaymentError> {
        if let Some(key) = input.idempotency_key.as_deref() {
            if let Some(order) = PaymentOrder::find_by_idempotency_key(&self.pool, key).await? {
                info!(order_id = %order.id, idempotency_key = %key, "Reusing existing top-up session");
                return Ok(TopUpSession {
                    order_id: order.id,
                    token: order.snap_token,
                    redirect_url: order.redirect_url,
                });
            }
        }

        let order_id = format!("topup-{}", Uuid::new_v4());
        let gateway = self.create_gateway_session(&order_id, input).await?;

        let order = PaymentOrder::create(
            &self.pool,
            &CreatePaymentOrder {
                id: order_id,
                idempotency_key: input.idempotency_key.clone(),
                amount: input.amount,
                customer_name: input.customer_name.clone(),
                customer_email: input.customer_email.clone(),
                snap_token: gateway.token.clone(),
                redirect_url: gateway.redirect_url.clone(),
            },
        )
        .await?;

        info!(order_id = %order.id, amount = order.amount, "Created top-up session");
        Ok(TopUpSession {
            order_id: order.id,
            token: gateway.token,
            redirect_url: gateway.redirect_url,
        })
    }

    async fn create_gateway_session(
        &self,
        order_id: &str,
        input: &TopUpInput,
    ) -> Result<GatewayResponse, PaymentError> {
        let url = self
            .base_url
            .join("snap/v1/transactions")
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let body = json!({
            "transaction_details": {
                "order_id": order_id,
                "gross_amount": input.amount,
            },
            "customer_details": {
                "first_name": input.customer_name,
                "email": input.customer_email,
            },
        });

        let res = self
            .http
            .post(url)
            .basic_auth(&self.server_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        match res.status() {
            s if s.is_success() => res
                .json::<GatewayResponse>()
                .await
                .map_err(|e| PaymentError::Serde(e.to_string())),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.get("error_messages")
                            .and_then(|m| m.get(0))
                            .or_else(|| v.get("message"))
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| format!("payment gateway returned status {status}"));
                Err(PaymentError::Gateway { status, message })
            }
        }
    }
}
