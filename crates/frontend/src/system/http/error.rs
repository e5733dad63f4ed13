use contracts::shared::ApiFailure;
use thiserror::Error;

/// Failure of a backend call, as seen by calling code
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Network unreachable, aborted or timed out
    #[error("Network error: {0}")]
    Transport(String),

    /// Refresh token missing or rejected; local session has been cleared
    #[error("Your session has expired. Please log in again.")]
    SessionInvalid,

    /// Non-success status, or an envelope without code 1000 and a result
    #[error("{message}")]
    Application {
        status: Option<u16>,
        code: Option<i32>,
        message: String,
    },

    #[error("Failed to serialize request: {0}")]
    Encode(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Fixed phrase for HTTP statuses the UI knows how to explain
pub fn status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Invalid request data"),
        401 => Some("Authentication required"),
        403 => Some("You do not have permission to perform this action"),
        404 => Some("Requested resource was not found"),
        500 => Some("Server error, please try again later"),
        _ => None,
    }
}

impl ApiError {
    /// Error for a non-2xx response
    pub fn from_status(status: u16, server_message: Option<String>, code: Option<i32>) -> Self {
        let message = status_message(status)
            .map(str::to_string)
            .or(server_message.filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        ApiError::Application {
            status: Some(status),
            code,
            message,
        }
    }

    /// Error for a 2xx response whose envelope is not a success
    pub fn from_failure(status: u16, failure: ApiFailure) -> Self {
        let message = failure
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        ApiError::Application {
            status: Some(status),
            code: Some(failure.code),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Application { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether repeating the same action may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Application { status, .. } => matches!(status, Some(s) if *s >= 500),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_status_wins_over_server_text() {
        let err = ApiError::from_status(403, Some("Access denied".into()), Some(1007));
        assert_eq!(err.to_string(), "You do not have permission to perform this action");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_unknown_status_uses_server_text() {
        let err = ApiError::from_status(409, Some("Quiz already started".into()), None);
        assert_eq!(err.to_string(), "Quiz already started");
        let err = ApiError::from_status(418, None, None);
        assert_eq!(err.to_string(), "Request failed with status 418");
    }

    #[test]
    fn test_envelope_failure_message() {
        let err = ApiError::from_failure(
            200,
            ApiFailure {
                code: 1005,
                message: None,
            },
        );
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::Transport("offline".into()).is_retryable());
        assert!(ApiError::from_status(500, None, None).is_retryable());
        assert!(!ApiError::from_status(400, None, None).is_retryable());
        assert!(!ApiError::SessionInvalid.is_retryable());
    }
}
