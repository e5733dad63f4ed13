use contracts::system::auth::{
    IntrospectRequest, IntrospectResponse, LoginRequest, LoginResponse, LogoutRequest,
    RegisterRequest,
};
use contracts::system::users::UserInfo;

use crate::system::http::{ApiClient, ApiError, ApiRequest};

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const LOGOUT_PATH: &str = "/api/auth/logout";
const INTROSPECT_PATH: &str = "/api/auth/introspect";

/// Calls under `/api/auth`; token refresh lives in the client itself
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Login with user name and password
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.client
            .send(ApiRequest::post(LOGIN_PATH).json(request)?.public())
            .await
    }

    /// Create a learner account
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserInfo, ApiError> {
        self.client
            .send(ApiRequest::post(REGISTER_PATH).json(request)?.public())
            .await
    }

    /// Invalidate the token server-side
    pub async fn logout(&self, token: String) -> Result<(), ApiError> {
        let request = ApiRequest::post(LOGOUT_PATH)
            .json(&LogoutRequest { token })?
            .public();
        let response = self.client.execute(request).await?;
        if response.is_success_status() {
            Ok(())
        } else {
            Err(ApiError::from_status(response.status, None, None))
        }
    }

    /// Ask the server whether a token is still valid
    pub async fn introspect(&self, token: String) -> Result<IntrospectResponse, ApiError> {
        self.client
            .send(
                ApiRequest::post(INTROSPECT_PATH)
                    .json(&IntrospectRequest { token })?
                    .public(),
            )
            .await
    }
}
