//! # Response Envelope
//!
//! Every JSON response, success or failure, has the same outer shape:
//!
//! ```text
//! { "success": true,  "message": "Message sent", "data": { ... } }
//! { "success": false, "message": "Conversation not found", "data": null }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_null_data() {
        let json = serde_json::to_value(ApiResponse::failure("Conversation not found")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "Conversation not found", "data": null })
        );
    }

    #[test]
    fn test_success_carries_data() {
        let json = serde_json::to_value(ApiResponse::success("ok", vec![1, 2])).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
