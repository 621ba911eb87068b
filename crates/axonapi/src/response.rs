//! Uniform response shape for every API call.

use serde_json::{Value, json};

/// Fallback used when a failed response carries no `error` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Normalized result of one HTTP exchange.
///
/// `code` is `0` when no HTTP status was received (connection failure,
/// timeout, unparsable body). `success` is true for any 2xx status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub code: u16,
    pub body: Value,
    pub success: bool,
}

impl ApiResponse {
    /// Build a response from a status code and raw body text.
    ///
    /// An empty body becomes `{}`. A body that is not JSON turns the whole
    /// response into a failure with `code = 0`.
    pub fn from_parts(code: u16, raw_body: &str) -> Self {
        let body = if raw_body.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(raw_body) {
                Ok(value) => value,
                Err(e) => {
                    log::debug!("Unparsable response body (HTTP {code}): {raw_body}");
                    return Self::failure(format!("invalid JSON in response: {e}"));
                }
            }
        };

        Self {
            code,
            body,
            success: (200..300).contains(&code),
        }
    }

    /// A failure without an HTTP status.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            body: json!({ "error": message.into() }),
            success: false,
        }
    }

    /// The server-provided error message, or [`UNKNOWN_ERROR`].
    pub fn error_message(&self) -> String {
        match self.body.get("error") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(other) if !other.is_null() && !other.is_string() => other.to_string(),
            _ => self
                .body
                .get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_ERROR)
                .to_string(),
        }
    }

    /// Entries of a list response.
    ///
    /// Accepts both `{"data": [...]}` and a bare array; anything else is empty.
    pub fn items(&self) -> &[Value] {
        match &self.body {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => items,
                _ => &[],
            },
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(ApiResponse::from_parts(200, "{}").success);
        assert!(ApiResponse::from_parts(201, "{\"id\":\"1\"}").success);
        assert!(ApiResponse::from_parts(204, "").success);
        assert!(!ApiResponse::from_parts(199, "{}").success);
        assert!(!ApiResponse::from_parts(300, "{}").success);
        assert!(!ApiResponse::from_parts(500, "{}").success);
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let response = ApiResponse::from_parts(204, "   ");
        assert_eq!(response.body, json!({}));
    }

    #[test]
    fn test_unparsable_body_is_failure() {
        let response = ApiResponse::from_parts(200, "<html>oops</html>");
        assert_eq!(response.code, 0);
        assert!(!response.success);
        assert!(response.error_message().contains("invalid JSON"));
    }

    #[test]
    fn test_error_message() {
        let response = ApiResponse::from_parts(400, r#"{"error":"threshold required"}"#);
        assert_eq!(response.error_message(), "threshold required");

        let response = ApiResponse::from_parts(500, "");
        assert_eq!(response.error_message(), UNKNOWN_ERROR);

        let response = ApiResponse::from_parts(409, r#"{"message":"duplicate"}"#);
        assert_eq!(response.error_message(), "duplicate");
    }

    #[test]
    fn test_failure() {
        let response = ApiResponse::failure("Connection failed");
        assert_eq!(response.code, 0);
        assert!(!response.success);
        assert_eq!(response.body["error"], "Connection failed");
    }

    #[test]
    fn test_items_shapes() {
        let wrapped = ApiResponse::from_parts(200, r#"{"data":[{"name":"a"}]}"#);
        assert_eq!(wrapped.items().len(), 1);

        let bare = ApiResponse::from_parts(200, r#"[{"name":"a"},{"name":"b"}]"#);
        assert_eq!(bare.items().len(), 2);

        let odd = ApiResponse::from_parts(200, r#"{"data":"nope"}"#);
        assert!(odd.items().is_empty());
    }
}
