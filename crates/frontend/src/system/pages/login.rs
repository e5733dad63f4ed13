use contracts::system::auth::LoginRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::register::RegisterForm;
use crate::system::auth::context::{do_login, use_auth, use_services};
use crate::system::auth::forms;

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = use_services();
    let auth = StoredValue::new_local(services.auth.clone());

    let (user_name, set_user_name) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error_message, set_error_message) = signal(Option::<String>::None);
    let (user_name_error, set_user_name_error) = signal(Option::<String>::None);
    let (password_error, set_password_error) = signal(Option::<String>::None);
    let (is_loading, set_is_loading) = signal(false);
    let (show_register, set_show_register) = signal(false);
    let (notice, set_notice) = signal(Option::<String>::None);

    let (_, set_auth_state) = use_auth();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let credentials = LoginRequest {
            user_name: user_name.get(),
            password: password.get(),
        };

        // Inline field errors; nothing is sent while the form is invalid
        let field_errors = forms::validate_login(&credentials).err().unwrap_or_default();
        set_user_name_error.set(field_errors.get("userName").map(str::to_string));
        set_password_error.set(field_errors.get("password").map(str::to_string));
        if !field_errors.is_empty() {
            return;
        }

        set_is_loading.set(true);
        set_error_message.set(None);

        let auth = auth.get_value();
        spawn_local(async move {
            if let Err(e) = do_login(auth, set_auth_state, credentials).await {
                set_error_message.set(Some(format!("Login failed: {}", e)));
            }
            set_is_loading.set(false);
        });
    };

    let on_registered = move |user_name_value: String| {
        set_show_register.set(false);
        set_user_name.set(user_name_value);
        set_password.set(String::new());
        set_notice.set(Some("Account created. You can log in now.".to_string()));
    };

    view! {
        <div class="login-container">
            <div class="login-box">
                <h1>"HSK Practice"</h1>

                <Show
                    when=move || !show_register.get()
                    fallback=move || view! {
                        <RegisterForm
                            on_registered=on_registered
                            on_cancel=move || set_show_register.set(false)
                        />
                    }
                >
                    <h2>"Log in"</h2>

                    <Show when=move || notice.get().is_some()>
                        <div class="info-message">
                            {move || notice.get().unwrap_or_default()}
                        </div>
                    </Show>

                    <Show when=move || error_message.get().is_some()>
                        <div class="error-message">
                            {move || error_message.get().unwrap_or_default()}
                        </div>
                    </Show>

                    <form on:submit=on_submit>
                        <div class="form-group">
                            <label for="userName">"User name"</label>
                            <input
                                type="text"
                                id="userName"
                                prop:value=move || user_name.get()
                                on:input=move |ev| set_user_name.set(event_target_value(&ev))
                                disabled=move || is_loading.get()
                            />
                            {move || user_name_error.get().map(|e| view! { <span class="field-error">{e}</span> })}
                        </div>

                        <div class="form-group">
                            <label for="password">"Password"</label>
                            <input
                                type="password"
                                id="password"
                                prop:value=move || password.get()
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                disabled=move || is_loading.get()
                            />
                            {move || password_error.get().map(|e| view! { <span class="field-error">{e}</span> })}
                        </div>

                        <button
                            type="submit"
                            class="btn-primary"
                            disabled=move || is_loading.get()
                        >
                            {move || if is_loading.get() { "Logging in..." } else { "Log in" }}
                        </button>
                    </form>

                    <div class="login-info">
                        <button class="btn-link" on:click=move |_| set_show_register.set(true)>
                            "Create an account"
                        </button>
                    </div>
                </Show>
            </div>
        </div>
    }
}
