use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// A created top-up checkout session at the payment gateway.
///
/// `idempotency_key` is the caller-supplied deduplication key; a repeated key
/// returns this row instead of opening a second session for the same intent.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PaymentOrder {
    pub id: String,
    pub idempotency_key: Option<String>,
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub snap_token: String,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a new order row; the gateway response supplies the token.
#[derive(Debug, Clone)]
pub struct CreatePaymentOrder {
    pub id: String,
    pub idempotency_key: Option<String>,
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub snap_token: String,
    pub redirect_url: Option<String>,
}

impl PaymentOrder {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreatePaymentOrder,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"INSERT INTO payment_orders
                (id, idempotency_key, amount, customer_name, customer_email, snap_token, redirect_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, idempotency_key, amount, customer_name, customer_email,
                snap_token, redirect_url, created_at"#,
        )
        .bind(&data.id)
        .bind(&data.idempotency_key)
        .bind(data.amount)
        .bind(&data.customer_name)
        .bind(&data.customer_email)
        .bind(&data.snap_token)
        .bind(&data.redirect_url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_idempotency_key(
        pool: &SqlitePool,
        key: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT
                id, idempotency_key, amount, customer_name, customer_email,
                snap_token, redirect_url, created_at
            FROM payment_orders
            WHERE idempotency_key = $1"#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn order(id: &str, key: Option<&str>) -> CreatePaymentOrder {
        CreatePaymentOrder {
            id: id.to_string(),
            idempotency_key: key.map(str::to_string),
            amount: 50_000,
            customer_name: "Budi".to_string(),
            customer_email: None,
            snap_token: "snap-token".to_string(),
            redirect_url: None,
        }
    }

    #[tokio::test]
    async fn find_by_idempotency_key_returns_created_order() {
        let db = DBService::new_in_memory().await.unwrap();
        PaymentOrder::create(&db.pool, &order("topup-1", Some("key-1")))
            .await
            .unwrap();

        let found = PaymentOrder::find_by_idempotency_key(&db.pool, "key-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "topup-1");
        assert_eq!(found.amount, 50_000);
    }

    #[tokio::test]
    async fn duplicate_idempotency_key_is_rejected_by_schema() {
        let db = DBService::new_in_memory().await.unwrap();
        PaymentOrder::create(&db.pool, &order("topup-1", Some("key-1")))
            .await
            .unwrap();

        let err = PaymentOrder::create(&db.pool, &order("topup-2", Some("key-1"))).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn orders_without_keys_do_not_collide() {
        let db = DBService::new_in_memory().await.unwrap();
        PaymentOrder::create(&db.pool, &order("topup-1", None)).await.unwrap();
        PaymentOrder::create(&db.pool, &order("topup-2", None)).await.unwrap();

        let found = PaymentOrder::find_by_idempotency_key(&db.pool, "absent").await.unwrap();
        assert!(found.is_none());
    }
}
