//! Settings store: point lookups over the `app_settings` key-value table,
//! merged over compiled-in defaults.

use db::models::setting::{AppSetting, SettingsKey};
use serde_json::Value;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("settings patch must be a JSON object")]
    NotAnObject,
}

/// Read/write facade over the settings table.
///
/// `fetch` surfaces failures as an explicit `Result`; `effective` is the
/// policy layer on top of it that substitutes the compiled-in default so a
/// transient store failure never blocks rendering.
#[derive(Clone)]
pub struct SettingsService {
    pool: SqlitePool,
}

impl SettingsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Point lookup of the stored record, if any.
    pub async fn fetch(&self, key: SettingsKey) -> Result<Option<Value>, SettingsError> {
        let row = AppSetting::find_by_id(&self.pool, &key.to_string()).await?;
        Ok(row.and_then(|r| r.parsed()))
    }

    /// The record callers actually see: stored fields overlaid on the
    /// default, or the default unmodified when the row is absent or the
    /// lookup fails. The error is logged, never propagated.
    pub async fn effective(&self, key: SettingsKey) -> Value {
        let default = key.default_value();
        match self.fetch(key).await {
            Ok(Some(stored)) => shallow_merge(default, &stored),
            Ok(None) => default,
            Err(e) => {
                warn!(key = %key, error = %e, "settings lookup failed, using default");
                default
            }
        }
    }

    /// Typed view of `effective`. A record that no longer matches the
    /// expected shape falls back to the compiled-in default.
    pub async fn effective_as<T>(&self, key: SettingsKey) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let value = self.effective(key).await;
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "stored settings have unexpected shape, using default");
                T::default()
            }
        }
    }

    /// Overlay `patch` on the current effective record and store the result
    /// as a whole-record replace. Concurrent updates are last-write-wins;
    /// no partial field mix can occur.
    pub async fn update(&self, key: SettingsKey, patch: &Value) -> Result<Value, SettingsError> {
        if !patch.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        let merged = shallow_merge(self.effective(key).await, patch);
        AppSetting::upsert(&self.pool, &key.to_string(), &merged).await?;
        Ok(merged)
    }
}

/// Field-by-field overlay of `stored` onto `default`. Top level only; a
/// stored nested object replaces the default one wholesale.
fn shallow_merge(default: Value, stored: &Value) -> Value {
    match (default, stored) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (k, v) in overlay {
                base.insert(k.clone(), v.clone());
            }
            Value::Object(base)
        }
        (default, _) => default,
    }
}

#[cfg(test)]
mod tests {
    use db::DBService;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn missing_row_yields_literal_default() {
        let db = DBService::new_in_memory().await.unwrap();
        let settings = SettingsService::new(db.pool.clone());

        let value = settings.effective(SettingsKey::Payment).await;
        assert_eq!(value, SettingsKey::Payment.default_value());
    }

    #[tokio::test]
    async fn stored_fields_overlay_the_default() {
        let db = DBService::new_in_memory().await.unwrap();
        AppSetting::upsert(&db.pool, "payment", &json!({"bankName": "BANK MANDIRI"}))
            .await
            .unwrap();
        let settings = SettingsService::new(db.pool.clone());

        let value = settings.effective(SettingsKey::Payment).await;
        assert_eq!(
            value,
            json!({
                "bankName": "BANK MANDIRI",
                "accountNumber": "1234567890",
                "accountHolder": "PT. CHIKA TEKNOLOGI",
            })
        );
    }

    #[tokio::test]
    async fn lookup_failure_yields_default_not_error() {
        let db = DBService::new_in_memory().await.unwrap();
        let settings = SettingsService::new(db.pool.clone());
        db.pool.close().await;

        let value = settings.effective(SettingsKey::PointValue).await;
        assert_eq!(value, SettingsKey::PointValue.default_value());
    }

    #[tokio::test]
    async fn back_to_back_updates_are_last_write_wins() {
        let db = DBService::new_in_memory().await.unwrap();
        let settings = SettingsService::new(db.pool.clone());

        settings
            .update(SettingsKey::PointValue, &json!({"pointValueInRp": 30}))
            .await
            .unwrap();
        settings
            .update(SettingsKey::PointValue, &json!({"pointValueInRp": 50}))
            .await
            .unwrap();

        let value = settings.effective(SettingsKey::PointValue).await;
        assert_eq!(value, json!({"pointValueInRp": 50}));
    }

    #[tokio::test]
    async fn update_rejects_non_object_patch() {
        let db = DBService::new_in_memory().await.unwrap();
        let settings = SettingsService::new(db.pool.clone());

        let err = settings
            .update(SettingsKey::Payment, &json!("BANK MANDIRI"))
            .await;
        assert!(matches!(err, Err(SettingsError::NotAnObject)));
    }

    #[test]
    fn merge_is_shallow() {
        let merged = shallow_merge(
            json!({"a": {"x": 1, "y": 2}, "b": 1}),
            &json!({"a": {"x": 9}}),
        );
        assert_eq!(merged, json!({"a": {"x": 9}, "b": 1}));
    }
}
