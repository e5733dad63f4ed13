use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Serialize;

use super::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Outbound call, relative to the API base
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Bearer token attached at send time
    pub bearer: Option<String>,
    /// Public endpoints skip bearer injection and the refresh interceptor
    pub authenticated: bool,
    /// Set once the request has been through a token refresh
    pub retry: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
            authenticated: true,
            retry: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json_value(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// 401 whose payload says the token expired
    ///
    /// A bare 401 (bad credentials, revoked account) is not an expiry.
    pub fn is_expiry_marked(&self) -> bool {
        if self.status != 401 {
            return false;
        }
        let Some(body) = self.json_value() else {
            return false;
        };
        ["message", "error", "errorCode"].iter().any(|field| {
            body.get(*field)
                .and_then(|v| v.as_str())
                .map(|s| s.to_ascii_lowercase().contains("expired"))
                .unwrap_or(false)
        })
    }
}

/// Sends one request to a fully qualified URL
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<RawResponse, ApiError>;
}

/// Browser `fetch` through gloo-net
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(url),
            HttpMethod::Post => Request::post(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {}", token));
        }

        let sent = match &request.body {
            Some(body) => {
                builder
                    .json(body)
                    .map_err(|e| ApiError::Encode(e.to_string()))?
                    .send()
                    .await
            }
            None => builder.send().await,
        };
        let response = sent.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}
