use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::{FromRow, SqlitePool};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Keys of the admin-editable settings records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SettingsKey {
    Payment,
    PointEarning,
    PointValue,
}

impl SettingsKey {
    /// Compiled-in default record for this key. Stored fields are overlaid
    /// on top of this object field-by-field.
    pub fn default_value(&self) -> Value {
        match self {
            SettingsKey::Payment => json!({
                "bankName": "BANK BCA",
                "accountNumber": "1234567890",
                "accountHolder": "PT. CHIKA TEKNOLOGI",
            }),
            SettingsKey::PointEarning => json!({
                "spendPerPoint": 10000,
                "enabled": true,
            }),
            SettingsKey::PointValue => json!({
                "pointValueInRp": 100,
            }),
        }
    }
}

/// Bank account shown on the payment instructions page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoSettings {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// How many rupiah a member must spend to earn one loyalty point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct PointEarningSettings {
    pub spend_per_point: i64,
    pub enabled: bool,
}

/// Redemption value of a single loyalty point, in rupiah.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct PointValueSettings {
    pub point_value_in_rp: i64,
}

impl Default for PaymentInfoSettings {
    fn default() -> Self {
        Self {
            bank_name: "BANK BCA".to_string(),
            account_number: "1234567890".to_string(),
            account_holder: "PT. CHIKA TEKNOLOGI".to_string(),
        }
    }
}

impl Default for PointEarningSettings {
    fn default() -> Self {
        Self {
            spend_per_point: 10000,
            enabled: true,
        }
    }
}

impl Default for PointValueSettings {
    fn default() -> Self {
        Self {
            point_value_in_rp: 100,
        }
    }
}

/// Raw row of the `app_settings` table: a string key and a JSON blob.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AppSetting {
    pub id: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppSetting {
    /// Parse the stored JSON blob; a corrupt blob reads as absent.
    pub fn parsed(&self) -> Option<Value> {
        serde_json::from_str(&self.data).ok()
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT id, data, created_at, updated_at
            FROM app_settings
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Replace the whole stored record for `id`.
    pub async fn upsert(pool: &SqlitePool, id: &str, data: &Value) -> Result<Self, sqlx::Error> {
        let blob =
            serde_json::to_string(data).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query_as(
            r#"INSERT INTO app_settings (id, data)
            VALUES ($1, $2)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = datetime('now', 'subsec')
            RETURNING id, data, created_at, updated_at"#,
        )
        .bind(id)
        .bind(blob)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn upsert_then_find_round_trips() {
        let db = DBService::new_in_memory().await.unwrap();
        let stored = json!({"bankName": "BANK MANDIRI"});

        AppSetting::upsert(&db.pool, "payment", &stored).await.unwrap();
        let row = AppSetting::find_by_id(&db.pool, "payment")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(row.id, "payment");
        assert_eq!(row.parsed().unwrap(), stored);
    }

    #[tokio::test]
    async fn find_missing_key_returns_none() {
        let db = DBService::new_in_memory().await.unwrap();
        let row = AppSetting::find_by_id(&db.pool, "point-value").await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_whole_record() {
        let db = DBService::new_in_memory().await.unwrap();
        AppSetting::upsert(&db.pool, "point-value", &json!({"pointValueInRp": 30}))
            .await
            .unwrap();
        AppSetting::upsert(&db.pool, "point-value", &json!({"pointValueInRp": 50}))
            .await
            .unwrap();

        let row = AppSetting::find_by_id(&db.pool, "point-value")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.parsed().unwrap(), json!({"pointValueInRp": 50}));
    }

    #[test]
    fn typed_defaults_agree_with_default_values() {
        assert_eq!(
            serde_json::to_value(PaymentInfoSettings::default()).unwrap(),
            SettingsKey::Payment.default_value()
        );
        assert_eq!(
            serde_json::to_value(PointEarningSettings::default()).unwrap(),
            SettingsKey::PointEarning.default_value()
        );
        assert_eq!(
            serde_json::to_value(PointValueSettings::default()).unwrap(),
            SettingsKey::PointValue.default_value()
        );
    }

    #[test]
    fn settings_key_round_trips_through_strings() {
        assert_eq!(SettingsKey::PointEarning.to_string(), "point-earning");
        assert_eq!(
            "point-value".parse::<SettingsKey>().unwrap(),
            SettingsKey::PointValue
        );
    }
}
