//! Authentication session controller.
//!
//! Owns the transitions between logged-out and logged-in. Navigation is
//! left to whoever observes the resulting state.

use contracts::system::auth::{LoginRequest, RegisterRequest, TokenPair};
use contracts::system::users::UserInfo;

use super::api::AuthApi;
use super::forms;
use super::storage::SessionStore;
use crate::system::http::ApiClient;

/// Result of a login attempt; failures carry a message instead of an error value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl LoginOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Clone)]
pub struct AuthController {
    api: AuthApi,
    store: SessionStore,
}

impl AuthController {
    pub fn new(client: ApiClient) -> Self {
        let store = client.store().clone();
        Self {
            api: AuthApi::new(client),
            store,
        }
    }

    pub async fn login(&self, credentials: LoginRequest) -> LoginOutcome {
        if let Err(errors) = forms::validate_login(&credentials) {
            return LoginOutcome::failed(errors.summary().unwrap_or_default());
        }

        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Login failed for {}: {}", credentials.user_name, e);
                return LoginOutcome::failed(e.to_string());
            }
        };

        let user = response.user.clone();
        let tokens = TokenPair::from(response);
        match self.store.save_session(&tokens, &user) {
            Ok(()) => {
                log::info!("Logged in as {}", user.user_name);
                LoginOutcome::ok()
            }
            Err(e) => LoginOutcome::failed(e.to_string()),
        }
    }

    /// Forget the local session; does not contact the server
    pub fn logout(&self) {
        self.store.clear();
        log::info!("Logged out");
    }

    /// Explicit sign-out: revoke server-side, then forget locally regardless
    pub async fn sign_out(&self) {
        if let Some(token) = self.store.access_token() {
            if let Err(e) = self.api.logout(token).await {
                log::warn!("Server logout failed: {}", e);
            }
        }
        self.logout();
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.store.current_user()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().map(|u| u.is_admin()).unwrap_or(false)
    }

    /// Register a new account; the caller logs in afterwards
    pub async fn register(&self, request: RegisterRequest) -> Result<UserInfo, String> {
        if let Err(errors) = forms::validate_register(&request) {
            return Err(errors.summary().unwrap_or_default());
        }
        self.api.register(&request).await.map_err(|e| e.to_string())
    }

    /// Check a restored session with the server
    ///
    /// A rejected access token is renewed with the stored refresh token; the
    /// session is cleared only when that fails too. Network failures keep the
    /// session: the server was not asked.
    pub async fn validate_session(&self) -> bool {
        let Some(token) = self.store.access_token() else {
            return false;
        };
        match self.api.introspect(token).await {
            Ok(response) if response.valid => true,
            Ok(_) if self.store.refresh_token().is_some() => {
                log::info!("Stored access token rejected, renewing session");
                match self.api.client().refresh_session().await {
                    Ok(()) => true,
                    Err(e) => {
                        log::info!("Stored session could not be renewed: {}", e);
                        false
                    }
                }
            }
            Ok(_) => {
                log::info!("Stored session rejected by introspection");
                self.store.clear();
                false
            }
            Err(e) => {
                log::warn!("Session introspection failed: {}", e);
                self.store.current_user().is_some()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::system::auth::storage::tests::{sample_tokens, sample_user};
    use crate::system::auth::storage::MemoryStorage;
    use crate::system::http::redirect::testing::RecordingRedirect;
    use crate::system::http::transport::testing::{ok_json, ScriptedTransport};
    use crate::system::http::{ApiError, RawResponse};

    fn controller(transport: Rc<ScriptedTransport>, store: SessionStore) -> AuthController {
        let client = ApiClient::new(
            "http://api",
            transport,
            store,
            Rc::new(RecordingRedirect::new()),
        );
        AuthController::new(client)
    }

    fn credentials(user: &str, password: &str) -> LoginRequest {
        LoginRequest {
            user_name: user.into(),
            password: password.into(),
        }
    }

    fn backend(request: &crate::system::http::ApiRequest) -> Result<RawResponse, ApiError> {
        match request.path.as_str() {
            "/api/auth/login" => {
                let body = request.body.clone().unwrap_or_default();
                if body["password"] == "right" {
                    ok_json(json!({
                        "accessToken": "access-1",
                        "refreshToken": "refresh-1",
                        "user": {"id": "u1", "userName": "lin", "roles": [{"name": "role_admin"}]}
                    }))
                } else {
                    Ok(RawResponse::new(401, r#"{"code":1006,"message":"Unauthenticated"}"#))
                }
            }
            "/api/quizzes" => ok_json(json!({"bearer": request.bearer})),
            "/api/auth/introspect" => {
                let body = request.body.clone().unwrap_or_default();
                ok_json(json!({"valid": body["token"] == "access-1"}))
            }
            "/api/auth/logout" => Ok(RawResponse::new(200, r#"{"code":1000}"#)),
            _ => Ok(RawResponse::new(404, "")),
        }
    }

    #[test]
    fn test_login_persists_session_then_calls_carry_bearer() {
        let transport = ScriptedTransport::new(backend);
        let store = SessionStore::new(Rc::new(MemoryStorage::new()));
        let auth = controller(transport.clone(), store.clone());

        let outcome = block_on(auth.login(credentials("lin", "right")));
        assert_eq!(outcome, LoginOutcome::ok());
        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
        assert!(auth.is_admin());

        let client = auth.api.client().clone();
        let result: serde_json::Value = block_on(client.get("/api/quizzes")).unwrap();
        assert_eq!(result["bearer"], "access-1");
    }

    #[test]
    fn test_failed_login_leaves_store_untouched() {
        let transport = ScriptedTransport::new(backend);
        let memory = MemoryStorage::new();
        let store = SessionStore::new(Rc::new(memory.clone()));
        let auth = controller(transport, store.clone());

        let outcome = block_on(auth.login(credentials("lin", "wrong")));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Authentication required"));
        assert!(memory.is_empty());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_invalid_credentials_never_hit_network() {
        let transport = ScriptedTransport::new(backend);
        let auth = controller(transport.clone(), SessionStore::new(Rc::new(MemoryStorage::new())));

        let outcome = block_on(auth.login(credentials("", "")));
        assert!(!outcome.success);
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_logout_clears_locally_only() {
        let transport = ScriptedTransport::new(backend);
        let memory = MemoryStorage::new();
        let store = SessionStore::new(Rc::new(memory.clone()));
        store.save_session(&sample_tokens(), &sample_user()).unwrap();
        let auth = controller(transport.clone(), store);

        auth.logout();
        assert!(memory.is_empty());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_sign_out_revokes_then_clears() {
        let transport = ScriptedTransport::new(backend);
        let memory = MemoryStorage::new();
        let store = SessionStore::new(Rc::new(memory.clone()));
        store.save_session(&sample_tokens(), &sample_user()).unwrap();
        let auth = controller(transport.clone(), store);

        block_on(auth.sign_out());
        assert_eq!(transport.calls_to("/api/auth/logout"), 1);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_validate_session() {
        let transport = ScriptedTransport::new(backend);
        let store = SessionStore::new(Rc::new(MemoryStorage::new()));
        store.save_session(&sample_tokens(), &sample_user()).unwrap();
        let auth = controller(transport, store.clone());
        assert!(block_on(auth.validate_session()));

        store
            .replace_tokens(&TokenPair {
                access_token: "stale".into(),
                refresh_token: "r".into(),
            })
            .unwrap();
        assert!(!block_on(auth.validate_session()));
        assert!(store.current_user().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_expired_access_token_renewed_on_boot() {
        let transport = ScriptedTransport::new(|req| match req.path.as_str() {
            "/api/auth/introspect" => ok_json(json!({"valid": false})),
            "/api/auth/refresh" => {
                ok_json(json!({"accessToken": "access-2", "refreshToken": "refresh-2"}))
            }
            _ => Ok(RawResponse::new(404, "")),
        });
        let store = SessionStore::new(Rc::new(MemoryStorage::new()));
        store.save_session(&sample_tokens(), &sample_user()).unwrap();
        let auth = controller(transport.clone(), store.clone());

        assert!(block_on(auth.validate_session()));
        assert_eq!(transport.calls_to("/api/auth/refresh"), 1);
        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-2"));
        assert!(auth.current_user().is_some());
    }

    #[test]
    fn test_rejected_session_without_refresh_token_is_cleared() {
        let transport = ScriptedTransport::new(|_| ok_json(json!({"valid": false})));
        let memory = MemoryStorage::new();
        let store = SessionStore::new(Rc::new(memory.clone()));
        store.save_session(&sample_tokens(), &sample_user()).unwrap();
        crate::system::auth::storage::KeyValueStorage::remove(
            &memory,
            crate::system::auth::storage::REFRESH_TOKEN_KEY,
        );
        let auth = controller(transport.clone(), store);

        assert!(!block_on(auth.validate_session()));
        assert_eq!(transport.calls_to("/api/auth/refresh"), 0);
        assert!(memory.is_empty());
    }
}
