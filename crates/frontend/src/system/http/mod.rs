//! HTTP layer shared by every API module.
//!
//! - `transport.rs`: wire-level request/response and the gloo-net transport
//! - `client.rs`: bearer injection and the token-refresh interceptor
//! - `error.rs`: error taxonomy surfaced to callers
//! - `redirect.rs`: forced navigation to the login page

pub mod client;
pub mod error;
pub mod redirect;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use redirect::{BrowserRedirect, LoginRedirect};
pub use transport::{ApiRequest, GlooTransport, HttpMethod, RawResponse, Transport};
