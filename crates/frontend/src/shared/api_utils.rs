//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

/// Port the backend listens on when served next to the client
pub const BACKEND_PORT: u16 = 8080;

/// Get the base URL for API requests
///
/// Constructs the API base URL from the current window location,
/// using port 8080 for the backend server.
///
/// # Returns
/// - API base URL like "http://localhost:8080"
/// - Empty string if window is not available
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, BACKEND_PORT)
}

/// Replace `{name}` placeholders in an endpoint template
///
/// # Example
/// ```rust
/// # use hsk_frontend::shared::api_utils::endpoint;
/// let path = endpoint("/api/quizzes/{id}/start/{userId}", &[("id", "3"), ("userId", "u1")]);
/// assert_eq!(path, "/api/quizzes/3/start/u1");
/// ```
pub fn endpoint(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}
