use chrono::{DateTime, Utc};
use contracts::domain::a001_quiz::{Quiz, QuizId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::domain::a001_quiz::api::{QuizApi, RemoteQuizApi};
use crate::domain::a001_quiz::eligibility::{self, Eligibility};
use crate::shared::date_utils::format_datetime;
use crate::shared::icons::icon;
use crate::system::auth::context::use_services;

#[derive(Clone, Debug, PartialEq)]
pub struct QuizRow {
    pub id: QuizId,
    pub title: String,
    pub quiz_type: String,
    pub lesson: String,
    pub time_limit: String,
    pub window: String,
    pub eligibility: Eligibility,
}

impl QuizRow {
    pub fn new(quiz: &Quiz, now: DateTime<Utc>) -> Self {
        let window = match (&quiz.start_time, &quiz.end_time) {
            (None, None) => "Always open".to_string(),
            (Some(start), None) => format!("From {}", format_datetime(start)),
            (None, Some(end)) => format!("Until {}", format_datetime(end)),
            (Some(start), Some(end)) => {
                format!("{} - {}", format_datetime(start), format_datetime(end))
            }
        };
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            quiz_type: quiz.quiz_type.label().to_string(),
            lesson: quiz
                .lesson
                .as_ref()
                .and_then(|l| l.title.clone())
                .unwrap_or_else(|| "-".to_string()),
            time_limit: quiz
                .time_limit_secs()
                .map(|secs| format!("{} min", secs / 60))
                .unwrap_or_else(|| "-".to_string()),
            window,
            eligibility: eligibility::check(quiz, now),
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.eligibility {
            Eligibility::Open => "Open",
            Eligibility::NotYetOpen { .. } => "Not yet open",
            Eligibility::Closed { .. } => "Closed",
        }
    }

    /// Every quiz can be opened; outside its window the page shows why
    pub fn action_label(&self) -> &'static str {
        if self.eligibility.is_open() {
            "Take quiz"
        } else {
            "Details"
        }
    }
}

/// Learner-facing list of quizzes with their availability
#[component]
pub fn QuizList(on_open: Callback<QuizId>) -> impl IntoView {
    let (items, set_items) = signal::<Vec<QuizRow>>(Vec::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(true);
    let services = use_services();

    let fetch = move || {
        let api = RemoteQuizApi::new(services.client.clone());
        set_loading.set(true);
        spawn_local(async move {
            match api.list_quizzes().await {
                Ok(quizzes) => {
                    let now = Utc::now();
                    set_items.set(quizzes.iter().map(|q| QuizRow::new(q, now)).collect());
                    set_error.set(None);
                }
                Err(e) => set_error.set(Some(e.to_string())),
            }
            set_loading.set(false);
        });
    };
    fetch();

    view! {
        <div class="content">
            <div class="header">
                <h2>{"Quizzes"}</h2>
            </div>
            {move || error.get().map(|e| view! { <div class="error">{e}</div> })}
            <Show when=move || loading.get()>
                <div class="quiz-list__loading">"Loading..."</div>
            </Show>
            <table class="table">
                <thead>
                    <tr>
                        <th>{"Title"}</th>
                        <th>{"Type"}</th>
                        <th>{"Lesson"}</th>
                        <th>{"Time limit"}</th>
                        <th>{"Window"}</th>
                        <th>{"Status"}</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || items.get()
                        key=|row| row.id
                        children=move |row| {
                            let id = row.id;
                            let action = row.action_label();
                            let status = row.status_label();
                            let hint = row.eligibility.message().unwrap_or_default();
                            view! {
                                <tr>
                                    <td>{row.title}</td>
                                    <td>{row.quiz_type}</td>
                                    <td>{row.lesson}</td>
                                    <td>{row.time_limit}</td>
                                    <td>{row.window}</td>
                                    <td title=hint>{status}</td>
                                    <td>
                                        <button class="btn btn-primary" on:click=move |_| on_open.run(id)>
                                            {icon("play")}
                                            {action}
                                        </button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}
