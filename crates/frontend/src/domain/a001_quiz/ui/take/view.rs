use contracts::domain::a001_quiz::{Question, QuestionId, Quiz, QuizId, QuizType};
use leptos::prelude::*;

use super::view_model::QuizTakeViewModel;
use crate::domain::a001_quiz::capture::fill_blank::{parse_blanks, Segment};
use crate::domain::a001_quiz::capture::multiple_choice::selection_mode;
use crate::domain::a001_quiz::capture::{CaptureBoard, SelectionMode};
use crate::domain::a001_quiz::countdown::Urgency;
use crate::domain::a001_quiz::session::SessionPhase;
use crate::shared::date_utils::{format_countdown, format_datetime};
use crate::shared::icons::icon;
use crate::system::auth::context::{use_auth, use_services};

#[component]
pub fn QuizTake(quiz_id: QuizId) -> impl IntoView {
    let services = use_services();
    let (auth_state, _) = use_auth();
    let user_id = auth_state.get_untracked().user_id().unwrap_or_default();

    let vm = QuizTakeViewModel::new(&services, quiz_id, user_id);
    vm.load();
    on_cleanup(move || vm.stop_timer());

    // re-render the panels only when the phase changes, not on every tick
    let phase = Memo::new(move |_| vm.phase());

    view! {
        <div class="quiz-take">
            {move || match phase.get() {
                SessionPhase::Loading => {
                    view! { <div class="quiz-take__loading">"Loading quiz..."</div> }.into_any()
                }
                SessionPhase::Ready | SessionPhase::Starting => {
                    view! { <ReadyPanel vm=vm /> }.into_any()
                }
                SessionPhase::InProgress => view! { <AttemptPanel vm=vm /> }.into_any(),
                SessionPhase::Completed => view! { <ResultPanel vm=vm /> }.into_any(),
                SessionPhase::Error => {
                    let message = vm.snapshot.with_untracked(|s| s.notice.clone()).unwrap_or_default();
                    view! { <div class="error">{message}</div> }.into_any()
                }
            }}
        </div>
    }
}

fn quiz_facts(quiz: &Quiz) -> Vec<(&'static str, String)> {
    let mut facts = vec![("Type", quiz.quiz_type.label().to_string())];
    if let Some(title) = quiz.lesson.as_ref().and_then(|l| l.title.clone()) {
        facts.push(("Lesson", title));
    }
    let limit = match quiz.time_limit_secs() {
        Some(secs) => format!("{} min", secs / 60),
        None => "No time limit".to_string(),
    };
    facts.push(("Time limit", limit));
    if let Some(start) = &quiz.start_time {
        facts.push(("Opens", format_datetime(start)));
    }
    if let Some(end) = &quiz.end_time {
        facts.push(("Closes", format_datetime(end)));
    }
    if let Some(limit) = quiz.attempt_limit {
        facts.push(("Attempts allowed", limit.to_string()));
    }
    facts
}

#[component]
fn ReadyPanel(vm: QuizTakeViewModel) -> impl IntoView {
    let quiz = vm.snapshot.with_untracked(|s| s.quiz.clone());
    let title = quiz.as_ref().map(|q| q.title.clone()).unwrap_or_default();
    let facts = quiz.as_ref().map(quiz_facts).unwrap_or_default();

    let starting = move || vm.phase() == SessionPhase::Starting;
    let can_start = move || {
        vm.snapshot.with(|s| {
            s.phase == SessionPhase::Ready && s.eligibility.map(|e| e.is_open()).unwrap_or(false)
        })
    };

    view! {
        <div class="quiz-ready">
            <h2>{title}</h2>
            <dl class="quiz-ready__facts">
                {facts
                    .into_iter()
                    .map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
                    .collect_view()}
            </dl>
            {move || vm.snapshot.with(|s| s.notice.clone()).map(|n| view! { <div class="warning">{n}</div> })}
            <button
                class="btn btn-primary"
                disabled=move || !can_start()
                on:click=move |_| vm.start_command()
            >
                {icon("play")}
                {move || if starting() { "Starting..." } else { "Start quiz" }}
            </button>
        </div>
    }
}

#[component]
fn AttemptPanel(vm: QuizTakeViewModel) -> impl IntoView {
    let Some(quiz) = vm.snapshot.with_untracked(|s| s.quiz.clone()) else {
        return view! { <div class="error">"Quiz is not available"</div> }.into_any();
    };
    let total = quiz.questions.len();

    let remaining = move || vm.snapshot.with(|s| s.remaining_secs);
    let warning = move || vm.snapshot.with(|s| s.urgency == Some(Urgency::Warning));
    let submitting = move || vm.snapshot.with(|s| s.submitting);

    let questions = match quiz.quiz_type {
        QuizType::MultipleChoice => quiz
            .questions
            .iter()
            .map(|q| choice_question(vm, q))
            .collect_view()
            .into_any(),
        QuizType::FillInBlank => quiz
            .questions
            .iter()
            .map(|q| blank_question(vm, q))
            .collect_view()
            .into_any(),
        QuizType::Matching => matching_board(vm, &quiz.questions).into_any(),
    };

    view! {
        <div class="quiz-attempt">
            <div class="quiz-attempt__header">
                <h2>{quiz.title.clone()}</h2>
                <Show when=move || remaining().is_some()>
                    <span class="quiz-timer" class:quiz-timer--warning=warning>
                        {icon("clock")}
                        {move || remaining().map(format_countdown).unwrap_or_default()}
                    </span>
                </Show>
            </div>
            {move || {
                vm.snapshot
                    .with(|s| s.notice.clone())
                    .map(|n| view! { <div class="error">{format!("Submission failed: {}", n)}</div> })
            }}
            <div class="quiz-attempt__questions">{questions}</div>
            <div class="quiz-attempt__footer">
                <span class="quiz-attempt__progress">
                    {move || format!("{}/{} answered", vm.answered_count(), total)}
                </span>
                <button
                    class="btn btn-primary"
                    disabled=move || !vm.is_ready_to_submit()
                    on:click=move |_| vm.submit_command()
                >
                    {icon("check")}
                    {move || if submitting() { "Submitting..." } else { "Submit" }}
                </button>
            </div>
        </div>
    }
    .into_any()
}

fn choice_question(vm: QuizTakeViewModel, question: &Question) -> impl IntoView {
    let question_id = question.id;
    let input_type = match selection_mode(question) {
        SelectionMode::Single => "radio",
        SelectionMode::Multi => "checkbox",
    };
    let group = format!("question-{}", question_id);

    let options = question
        .options
        .iter()
        .map(|option| {
            let for_check = option.clone();
            let for_click = option.clone();
            let checked = move || {
                vm.board.with(|board| match board {
                    Some(CaptureBoard::MultipleChoice(capture)) => capture
                        .model(question_id)
                        .map(|m| m.is_selected(&for_check))
                        .unwrap_or(false),
                    _ => false,
                })
            };
            view! {
                <label class="quiz-option">
                    <input
                        type=input_type
                        name=group.clone()
                        prop:checked=checked
                        disabled=move || vm.is_locked()
                        on:change=move |_| vm.select_choice(question_id, for_click.clone())
                    />
                    {option.clone()}
                </label>
            }
        })
        .collect_view();

    view! {
        <div class="quiz-question">
            <p class="quiz-question__text">{question.question_text.clone()}</p>
            <div class="quiz-question__options">{options}</div>
        </div>
    }
}

fn blank_value(vm: QuizTakeViewModel, question_id: QuestionId, position: usize) -> String {
    vm.board.with(|board| match board {
        Some(CaptureBoard::FillInBlank(capture)) => capture
            .model(question_id)
            .map(|m| m.value(position).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    })
}

fn blank_input(vm: QuizTakeViewModel, question_id: QuestionId, position: usize) -> impl IntoView {
    view! {
        <input
            type="text"
            class="quiz-blank"
            prop:value=move || blank_value(vm, question_id, position)
            disabled=move || vm.is_locked()
            on:input=move |ev| vm.set_blank(question_id, position, event_target_value(&ev))
        />
    }
}

fn blank_question(vm: QuizTakeViewModel, question: &Question) -> impl IntoView {
    let question_id = question.id;
    let template = parse_blanks(&question.question_text);
    let trailing = template.blank_count == 0;

    let parts = template
        .segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => view! { <span>{text}</span> }.into_any(),
            Segment::Blank(position) => blank_input(vm, question_id, position).into_any(),
        })
        .collect_view();

    view! {
        <div class="quiz-question">
            <p class="quiz-question__text">
                {parts}
                {trailing.then(|| blank_input(vm, question_id, 0))}
            </p>
            <button
                class="btn btn-secondary"
                disabled=move || vm.is_locked()
                on:click=move |_| vm.clear_blanks(question_id)
            >
                {icon("eraser")}
                "Clear"
            </button>
        </div>
    }
}

fn matching_board(vm: QuizTakeViewModel, questions: &[Question]) -> impl IntoView {
    let left = questions
        .iter()
        .map(|question| {
            let question_id = question.id;
            let selected = move || {
                vm.board.with(|board| match board {
                    Some(CaptureBoard::Matching(m)) => m.selected_left() == Some(question_id),
                    _ => false,
                })
            };
            let pair = move || {
                vm.board.with(|board| match board {
                    Some(CaptureBoard::Matching(m)) => {
                        m.pair_of(question_id).map(|p| p.trim().to_string())
                    }
                    _ => None,
                })
            };
            view! {
                <button
                    class="quiz-match__item"
                    class:quiz-match__item--selected=selected
                    class:quiz-match__item--paired=move || pair().is_some()
                    disabled=move || vm.is_locked()
                    on:click=move |_| vm.match_left(question_id)
                >
                    <span>{question.question_text.clone()}</span>
                    {move || pair().map(|p| view! { <span class="quiz-match__pair">{p}</span> })}
                </button>
            }
        })
        .collect_view();

    let right = move || {
        let candidates: Vec<(String, bool)> = vm.board.with(|board| match board {
            Some(CaptureBoard::Matching(m)) => m
                .candidates()
                .iter()
                .map(|c| (c.clone(), m.is_taken(c)))
                .collect(),
            _ => Vec::new(),
        });
        candidates
            .into_iter()
            .map(|(value, taken)| {
                let label = value.trim().to_string();
                view! {
                    <button
                        class="quiz-match__item"
                        disabled=move || taken || vm.is_locked()
                        on:click=move |_| vm.match_right(value.clone())
                    >
                        {label}
                    </button>
                }
            })
            .collect_view()
    };

    view! {
        <div class="quiz-match">
            <div class="quiz-match__column">{left}</div>
            <div class="quiz-match__column">{right}</div>
        </div>
    }
}

#[component]
fn ResultPanel(vm: QuizTakeViewModel) -> impl IntoView {
    let snapshot = vm.snapshot.get_untracked();
    let title = snapshot.quiz.map(|q| q.title).unwrap_or_default();
    let Some(result) = snapshot.result else {
        return view! { <div class="error">"No result available"</div> }.into_any();
    };
    let completed = result
        .completed_at
        .as_ref()
        .map(format_datetime)
        .unwrap_or_else(|| "-".to_string());

    view! {
        <div class="quiz-result">
            <h2>{title}</h2>
            <div class="quiz-result__score">
                {format!("{} / {}", result.score, result.total_questions)}
                <span class="quiz-result__percent">{format!("{:.0}%", result.percentage())}</span>
            </div>
            <dl>
                <dt>"Answered"</dt>
                <dd>{format!("{} of {}", snapshot.answered, snapshot.total)}</dd>
                <dt>"Completed"</dt>
                <dd>{completed}</dd>
            </dl>
        </div>
    }
    .into_any()
}
