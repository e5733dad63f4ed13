use std::rc::Rc;

use contracts::system::auth::LoginRequest;
use contracts::system::users::UserInfo;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::controller::AuthController;
use super::storage::SessionStore;
use crate::shared::config::AppConfig;
use crate::system::http::{ApiClient, BrowserRedirect, GlooTransport};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user_info: Option<UserInfo>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user_info.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user_info
            .as_ref()
            .map(|u| u.is_admin())
            .unwrap_or(false)
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_info.as_ref().map(|u| u.id.clone())
    }
}

/// Services shared by every page: config, API client, auth controller
#[derive(Clone)]
pub struct AppServices {
    pub config: Rc<AppConfig>,
    pub client: ApiClient,
    pub auth: AuthController,
}

impl AppServices {
    pub fn browser(config: AppConfig) -> Self {
        let client = ApiClient::new(
            config.api_base.clone(),
            Rc::new(GlooTransport),
            SessionStore::browser(),
            Rc::new(BrowserRedirect::new(config.login_path.clone())),
        );
        let auth = AuthController::new(client.clone());
        Self {
            config: Rc::new(config),
            client,
            auth,
        }
    }
}

/// Auth context provider component
#[component]
pub fn AuthProvider(children: ChildrenFn) -> impl IntoView {
    let services = AppServices::browser(AppConfig::load());
    let (auth_state, set_auth_state) = signal(AuthState {
        user_info: services.auth.current_user(),
    });

    // Check a session restored from localStorage with the server
    if auth_state.get_untracked().is_authenticated() {
        let auth = services.auth.clone();
        spawn_local(async move {
            if !auth.validate_session().await {
                set_auth_state.set(AuthState::default());
            }
        });
    }

    provide_context(auth_state);
    provide_context(set_auth_state);
    provide_context(StoredValue::new_local(services));

    children()
}

/// Hook to access auth state
pub fn use_auth() -> (ReadSignal<AuthState>, WriteSignal<AuthState>) {
    let auth_state =
        use_context::<ReadSignal<AuthState>>().expect("AuthProvider not found in component tree");
    let set_auth_state =
        use_context::<WriteSignal<AuthState>>().expect("AuthProvider not found in component tree");

    (auth_state, set_auth_state)
}

/// Hook to access the shared services
pub fn use_services() -> AppServices {
    use_context::<StoredValue<AppServices, LocalStorage>>()
        .expect("AuthProvider not found in component tree")
        .get_value()
}

/// Helper: Perform login and publish the new state
pub async fn do_login(
    auth: AuthController,
    set_auth_state: WriteSignal<AuthState>,
    credentials: LoginRequest,
) -> Result<(), String> {
    let outcome = auth.login(credentials).await;
    if !outcome.success {
        return Err(outcome.error.unwrap_or_default());
    }
    set_auth_state.set(AuthState {
        user_info: auth.current_user(),
    });
    Ok(())
}

/// Helper: Perform explicit sign-out and publish the cleared state
pub async fn do_logout(auth: AuthController, set_auth_state: WriteSignal<AuthState>) {
    auth.sign_out().await;
    set_auth_state.set(AuthState::default());
}
