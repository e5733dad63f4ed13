use contracts::domain::a001_quiz::QuizId;
use leptos::prelude::*;
use serde::Deserialize;

use crate::domain::a001_quiz::ui::list::QuizList;
use crate::domain::a001_quiz::ui::take::QuizTake;
use crate::layout::Shell;
use crate::system::auth::context::use_auth;
use crate::system::auth::guard::RequireAuth;
use crate::system::pages::login::LoginPage;

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    quiz: Option<QuizId>,
}

/// Quiz selected by a `?quiz=<id>` deep link
fn quiz_from_query(search: &str) -> Option<QuizId> {
    let query = search.trim_start_matches('?');
    if query.is_empty() {
        return None;
    }
    serde_qs::from_str::<PageQuery>(query)
        .map_err(|e| log::warn!("ignoring query '{}': {}", query, e))
        .ok()
        .and_then(|q| q.quiz)
}

fn initial_quiz() -> Option<QuizId> {
    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    quiz_from_query(&search)
}

#[component]
fn MainLayout() -> impl IntoView {
    let selected = RwSignal::new(initial_quiz());
    let open_quiz = Callback::new(move |id: QuizId| selected.set(Some(id)));

    view! {
        <Shell>
            {move || match selected.get() {
                Some(quiz_id) => view! {
                    <div class="quiz-page">
                        <button class="btn btn-secondary" on:click=move |_| selected.set(None)>
                            "Back to quizzes"
                        </button>
                        <RequireAuth>
                            <QuizTake quiz_id=quiz_id />
                        </RequireAuth>
                    </div>
                }
                .into_any(),
                None => view! { <QuizList on_open=open_quiz /> }.into_any(),
            }}
        </Shell>
    }
}

#[component]
pub fn AppRoutes() -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || auth_state.get().is_authenticated()
            fallback=|| view! { <LoginPage /> }
        >
            <MainLayout />
        </Show>
    }
}
