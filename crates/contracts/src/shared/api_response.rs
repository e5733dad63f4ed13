//! Response envelope returned by every backend endpoint.
//!
//! The transport layer may report success while the application layer
//! did not: a body is only successful when `code == 1000` and a `result`
//! is present.

use serde::{Deserialize, Serialize};

/// Application-level success code
pub const SUCCESS_CODE: i32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

/// Envelope that did not carry a usable result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub code: i32,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: None,
            result: Some(result),
        }
    }

    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            result: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE && self.result.is_some()
    }

    /// Unwrap the envelope, treating a wrong code or a missing result as failure
    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self.result {
            Some(result) if self.code == SUCCESS_CODE => Ok(result),
            _ => Err(ApiFailure {
                code: self.code,
                message: self.message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let body = r#"{"code":1000,"result":{"value":7}}"#;
        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(parsed.is_success());
        assert_eq!(parsed.into_result().unwrap()["value"], 7);
    }

    #[test]
    fn test_wrong_code_is_failure() {
        let body = r#"{"code":1002,"message":"User existed","result":{"value":7}}"#;
        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();
        let failure = parsed.into_result().unwrap_err();
        assert_eq!(failure.code, 1002);
        assert_eq!(failure.message.as_deref(), Some("User existed"));
    }

    #[test]
    fn test_missing_result_is_failure() {
        let body = r#"{"code":1000}"#;
        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(!parsed.is_success());
        assert!(parsed.into_result().is_err());
    }
}
