//! TopHeader component - application top navigation bar.
//!
//! Contains:
//! - Application title
//! - Current user and role badge
//! - Sign-out action

use crate::shared::icons::icon;
use crate::system::auth::context::{do_logout, use_auth, use_services};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn TopHeader() -> impl IntoView {
    let (auth_state, set_auth_state) = use_auth();
    let auth = StoredValue::new_local(use_services().auth);

    let logout = move |_| {
        let auth = auth.get_value();
        spawn_local(async move {
            do_logout(auth, set_auth_state).await;
        });
    };

    let is_admin = move || auth_state.get().is_admin();

    view! {
        <div class="top-header">
            <div class="top-header__brand">
                <span class="top-header__title">"HSK Practice"</span>
            </div>

            <div class="top-header__actions">
                <div class="top-header__user">
                    {icon("user")}
                    <span>
                        {move || auth_state.get().user_info
                            .map(|u| u.display_name())
                            .unwrap_or_else(|| "Guest".to_string())}
                    </span>
                    <Show when=is_admin>
                        <span class="top-header__badge">"Admin"</span>
                    </Show>
                </div>

                <button class="top-header__icon-btn" on:click=logout title="Sign out">
                    {icon("log-out")}
                </button>
            </div>
        </div>
    }
}
