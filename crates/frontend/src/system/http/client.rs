//! Authenticated API client with the token-refresh interceptor.
//!
//! Expired access tokens are refreshed at most once per request. While a
//! refresh is in flight, further expired requests queue up instead of
//! issuing their own refresh; after success the failing requests are
//! replayed in the order they failed. A failed refresh clears the session
//! and forces a redirect to the login page.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use contracts::shared::ApiResponse;
use contracts::system::auth::{RefreshRequest, TokenPair};
use futures::channel::oneshot;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::redirect::LoginRedirect;
use super::transport::{ApiRequest, RawResponse, Transport};
use crate::system::auth::storage::SessionStore;

pub const REFRESH_PATH: &str = "/api/auth/refresh";

type Responder = oneshot::Sender<Result<RawResponse, ApiError>>;

/// Request parked until the in-flight refresh settles; `None` only waits
struct PendingReplay {
    request: Option<ApiRequest>,
    responder: Responder,
}

enum RefreshState {
    Idle,
    Refreshing { queue: VecDeque<PendingReplay> },
}

/// Returns the interceptor to `Idle` if the refreshing future is dropped
struct RefreshGuard {
    state: Rc<RefCell<RefreshState>>,
    armed: bool,
}

impl RefreshGuard {
    fn finish(mut self) -> VecDeque<PendingReplay> {
        self.armed = false;
        match std::mem::replace(&mut *self.state.borrow_mut(), RefreshState::Idle) {
            RefreshState::Refreshing { queue } => queue,
            RefreshState::Idle => VecDeque::new(),
        }
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Ok(mut state) = self.state.try_borrow_mut() {
                *state = RefreshState::Idle;
            }
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: Rc<str>,
    transport: Rc<dyn Transport>,
    store: SessionStore,
    redirect: Rc<dyn LoginRedirect>,
    refresh: Rc<RefCell<RefreshState>>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Rc<dyn Transport>,
        store: SessionStore,
        redirect: Rc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            base_url: Rc::from(base_url.into()),
            transport,
            store,
            redirect,
            refresh: Rc::new(RefCell::new(RefreshState::Idle)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.refresh.borrow(), RefreshState::Refreshing { .. })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// Execute a request and unwrap its `{code, message, result}` envelope
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        decode_envelope(&response)
    }

    /// Execute a request through the refresh interceptor, returning the raw response
    pub async fn execute(&self, mut request: ApiRequest) -> Result<RawResponse, ApiError> {
        if request.authenticated {
            request.bearer = self.store.access_token();
        }
        let response = self.transport.send(&self.url(&request.path), &request).await?;

        if !request.authenticated || !response.is_expiry_marked() {
            return Ok(response);
        }
        if request.retry {
            log::warn!("{} still expired after refresh, giving up", request.path);
            return Ok(response);
        }
        request.retry = true;

        // Another request already refreshed since this one was sent
        if let Some(current) = self.store.access_token() {
            if request.bearer.as_deref() != Some(current.as_str()) && !self.is_refreshing() {
                request.bearer = Some(current);
                return self.transport.send(&self.url(&request.path), &request).await;
            }
        }

        if self.is_refreshing() {
            return self.wait_for_refresh(request).await;
        }
        self.refresh_and_replay(request).await
    }

    async fn wait_for_refresh(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let (responder, receiver) = oneshot::channel();
        match &mut *self.refresh.borrow_mut() {
            RefreshState::Refreshing { queue } => {
                log::debug!("Queueing {} behind in-flight token refresh", request.path);
                queue.push_back(PendingReplay {
                    request: Some(request),
                    responder,
                });
            }
            RefreshState::Idle => {
                let _ = responder.send(Err(ApiError::SessionInvalid));
            }
        }
        receiver.await.unwrap_or(Err(ApiError::SessionInvalid))
    }

    async fn refresh_and_replay(&self, mut request: ApiRequest) -> Result<RawResponse, ApiError> {
        let (access_token, queue) = self.refresh_tokens().await?;
        log::info!("Token refreshed, replaying {} request(s)", queue.len() + 1);

        request.bearer = Some(access_token.clone());
        let own = self.transport.send(&self.url(&request.path), &request).await;
        self.replay(queue, &access_token).await;
        own
    }

    /// Renew the stored tokens outside of a failing request, e.g. on boot
    ///
    /// Joins a refresh already in flight instead of starting another one.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        if self.is_refreshing() {
            let (responder, receiver) = oneshot::channel();
            if let RefreshState::Refreshing { queue } = &mut *self.refresh.borrow_mut() {
                queue.push_back(PendingReplay {
                    request: None,
                    responder,
                });
            }
            return match receiver.await {
                Ok(_) => Ok(()),
                Err(_) => Err(ApiError::SessionInvalid),
            };
        }
        let (access_token, queue) = self.refresh_tokens().await?;
        log::info!("Session renewed");
        self.replay(queue, &access_token).await;
        Ok(())
    }

    /// Single-flight refresh; hands back the new access token and the parked requests
    async fn refresh_tokens(&self) -> Result<(String, VecDeque<PendingReplay>), ApiError> {
        let Some(refresh_token) = self.store.refresh_token() else {
            log::warn!("Access token expired and no refresh token is stored");
            self.invalidate_session();
            return Err(ApiError::SessionInvalid);
        };

        *self.refresh.borrow_mut() = RefreshState::Refreshing {
            queue: VecDeque::new(),
        };
        let guard = RefreshGuard {
            state: self.refresh.clone(),
            armed: true,
        };

        log::debug!("Access token expired, refreshing");
        let tokens = match self.request_new_tokens(refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                log::warn!("Token refresh failed: {}", e);
                // Parked requests fail once their responders drop
                drop(guard.finish());
                self.invalidate_session();
                return Err(ApiError::SessionInvalid);
            }
        };

        if let Err(e) = self.store.replace_tokens(&tokens) {
            log::warn!("Refreshed tokens could not be persisted: {}", e);
        }
        Ok((tokens.access_token, guard.finish()))
    }

    async fn replay(&self, queue: VecDeque<PendingReplay>, access_token: &str) {
        for pending in queue {
            let result = match pending.request {
                Some(mut replay) => {
                    replay.bearer = Some(access_token.to_string());
                    self.transport.send(&self.url(&replay.path), &replay).await
                }
                None => Ok(RawResponse::new(200, "")),
            };
            let _ = pending.responder.send(result);
        }
    }

    async fn request_new_tokens(&self, refresh_token: String) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest { refresh_token })?
            .public();
        let response = self.transport.send(&self.url(REFRESH_PATH), &request).await?;
        decode_envelope(&response)
    }

    /// Clear local session state and leave for the login page
    pub fn invalidate_session(&self) {
        log::warn!("Session invalid, logging out");
        self.store.clear();
        self.redirect.redirect_to_login();
    }
}

/// Unwrap a `{code, message, result}` body, mapping every failure shape to `ApiError`
pub fn decode_envelope<T: DeserializeOwned>(response: &RawResponse) -> Result<T, ApiError> {
    if !response.is_success_status() {
        let envelope = serde_json::from_str::<ApiResponse<serde_json::Value>>(&response.body).ok();
        let (message, code) = envelope
            .map(|e| (e.message, Some(e.code)))
            .unwrap_or((None, None));
        return Err(ApiError::from_status(response.status, message, code));
    }

    let envelope: ApiResponse<T> =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    envelope
        .into_result()
        .map_err(|failure| ApiError::from_failure(response.status, failure))
}
