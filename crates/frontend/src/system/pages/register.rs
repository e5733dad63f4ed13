use contracts::system::auth::RegisterRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::system::auth::context::use_services;
use crate::system::auth::forms;

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[component]
pub fn RegisterForm<R, C>(on_registered: R, on_cancel: C) -> impl IntoView
where
    R: Fn(String) + Clone + Send + Sync + 'static,
    C: Fn() + Clone + Send + Sync + 'static,
{
    let services = use_services();
    let auth = StoredValue::new_local(services.auth.clone());

    let form = RwSignal::new(RegisterRequest::default());
    let (error_message, set_error_message) = signal(Option::<String>::None);
    let (is_loading, set_is_loading) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let mut request = form.get();
        request.email = request.email.and_then(optional);
        request.first_name = request.first_name.and_then(optional);
        request.last_name = request.last_name.and_then(optional);

        if let Err(errors) = forms::validate_register(&request) {
            set_error_message.set(errors.summary());
            return;
        }

        set_is_loading.set(true);
        set_error_message.set(None);

        let auth = auth.get_value();
        let on_registered = on_registered.clone();
        spawn_local(async move {
            match auth.register(request).await {
                Ok(user) => {
                    log::info!("Registered {}", user.user_name);
                    on_registered(user.user_name);
                }
                Err(e) => set_error_message.set(Some(format!("Registration failed: {}", e))),
            }
            set_is_loading.set(false);
        });
    };

    view! {
        <div class="register-form">
            <h2>"Create an account"</h2>

            {move || error_message.get().map(|e| view! { <div class="error-message">{e}</div> })}

            <form on:submit=on_submit>
                <div class="form-group">
                    <label for="reg-userName">"User name"</label>
                    <input
                        type="text"
                        id="reg-userName"
                        prop:value=move || form.get().user_name
                        on:input=move |ev| form.update(|f| f.user_name = event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="reg-password">"Password"</label>
                    <input
                        type="password"
                        id="reg-password"
                        prop:value=move || form.get().password
                        on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="reg-firstName">"First name"</label>
                    <input
                        type="text"
                        id="reg-firstName"
                        prop:value=move || form.get().first_name.unwrap_or_default()
                        on:input=move |ev| form.update(|f| f.first_name = Some(event_target_value(&ev)))
                    />
                </div>
                <div class="form-group">
                    <label for="reg-lastName">"Last name"</label>
                    <input
                        type="text"
                        id="reg-lastName"
                        prop:value=move || form.get().last_name.unwrap_or_default()
                        on:input=move |ev| form.update(|f| f.last_name = Some(event_target_value(&ev)))
                    />
                </div>
                <div class="form-group">
                    <label for="reg-email">"Email"</label>
                    <input
                        type="email"
                        id="reg-email"
                        prop:value=move || form.get().email.unwrap_or_default()
                        on:input=move |ev| form.update(|f| f.email = Some(event_target_value(&ev)))
                    />
                </div>

                <button type="submit" class="btn-primary" disabled=move || is_loading.get()>
                    {move || if is_loading.get() { "Creating..." } else { "Create account" }}
                </button>
                <button type="button" class="btn-link" on:click=move |_| on_cancel()>
                    "Back to login"
                </button>
            </form>
        </div>
    }
}
