//! Uniform JSON envelope returned by every API route.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Response envelope. Exactly one of `data` / `message` is populated:
/// a successful response carries `data`, a failed one carries `message`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_data_only() {
        let res = ApiResponse::success(42);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert_eq!(json["message"], serde_json::Value::Null);
    }

    #[test]
    fn error_carries_message_only() {
        let res = ApiResponse::<()>::error("missing required fields");
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(json["message"], "missing required fields");
    }
}
