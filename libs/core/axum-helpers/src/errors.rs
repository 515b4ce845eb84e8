//! Structured error responses shared by extractors and handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// Standard error messages and codes for consistent API responses
pub mod messages {
    pub const VALIDATION_FAILED: &str = "Request validation failed";
    pub const UNAUTHORIZED: &str = "Authentication required";

    // Error codes for client parsing
    pub const CODE_VALIDATION: &str = "VALIDATION_ERROR";
    pub const CODE_UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
    pub const CODE_CONFLICT: &str = "CONFLICT";
    pub const CODE_INTERNAL: &str = "INTERNAL_ERROR";
}

/// JSON envelope for every error the API returns.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_skips_empty_fields() {
        let body = serde_json::to_value(ErrorResponse::new("NotFound", "no such user")).unwrap();
        assert_eq!(body["error"], "NotFound");
        assert!(body.get("details").is_none());
        assert!(body.get("code").is_none());
    }

    #[test]
    fn test_error_response_with_code() {
        let resp = ErrorResponse::new("Conflict", "duplicate").with_code(messages::CODE_CONFLICT);
        let body = serde_json::to_value(resp).unwrap();
        assert_eq!(body["code"], "CONFLICT");
    }
}
