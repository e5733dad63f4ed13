//! Quiz attempt lifecycle.
//!
//! `Loading -> Ready -> Starting -> InProgress -> Completed`, with `Error`
//! for a quiz that cannot be fetched at all. A failed start falls back to
//! `Ready`; a failed submission stays `InProgress` with the answers kept.
//! Every method rejects calls that do not fit the current state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use contracts::domain::a001_quiz::{
    AnswerValue, QuestionId, Quiz, QuizId, QuizResult, SubmitQuizRequest,
};
use thiserror::Error;

use super::countdown::{Countdown, Urgency};
use super::eligibility::{self, Eligibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Starting,
    InProgress,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the quiz is {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error("{0}")]
    NotEligible(String),
    #[error("the quiz is already being submitted")]
    AlreadySubmitting,
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
}

/// One started attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub quiz: Quiz,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub countdown: Option<Countdown>,
    pub answers: BTreeMap<QuestionId, AnswerValue>,
    /// Set while a submit call is outstanding
    pub submitting: Option<SubmitTrigger>,
    pub auto_submit_fired: bool,
    pub last_error: Option<String>,
}

impl Attempt {
    fn plan(&self, trigger: SubmitTrigger) -> SubmitPlan {
        SubmitPlan {
            quiz_id: self.quiz.id,
            trigger,
            request: SubmitQuizRequest::new(self.user_id.clone(), &self.answers),
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| !a.is_empty()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Ready {
        quiz: Quiz,
        notice: Option<String>,
    },
    Starting {
        quiz: Quiz,
    },
    InProgress(Attempt),
    Completed {
        quiz: Quiz,
        result: QuizResult,
        answers: BTreeMap<QuestionId, AnswerValue>,
    },
    Error {
        message: String,
    },
}

/// Everything needed to call the submit endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitPlan {
    pub quiz_id: QuizId,
    pub trigger: SubmitTrigger,
    pub request: SubmitQuizRequest,
}

/// Outcome of one timer tick
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Nothing to count down
    Idle,
    Running { remaining_secs: i64 },
    AutoSubmit(SubmitPlan),
}

/// Read-only view of the session for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub quiz: Option<Quiz>,
    pub eligibility: Option<Eligibility>,
    pub notice: Option<String>,
    pub remaining_secs: Option<i64>,
    pub urgency: Option<Urgency>,
    pub answered: usize,
    pub total: usize,
    pub submitting: bool,
    /// Deadline passed or the timeout submission already fired
    pub overdue: bool,
    pub result: Option<QuizResult>,
}

impl SessionSnapshot {
    /// Capture controls are live only in an attempt with no submission in flight
    pub fn accepts_answers(&self) -> bool {
        self.phase == SessionPhase::InProgress && !self.submitting
    }

    /// Manual submit needs every question answered, unless time is up
    pub fn can_submit(&self, all_answered: bool) -> bool {
        self.accepts_answers() && (all_answered || self.overdue)
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Loading,
            quiz: None,
            eligibility: None,
            notice: None,
            remaining_secs: None,
            urgency: None,
            answered: 0,
            total: 0,
            submitting: false,
            overdue: false,
            result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    state: SessionState,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Loading,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            SessionState::Loading => SessionPhase::Loading,
            SessionState::Ready { .. } => SessionPhase::Ready,
            SessionState::Starting { .. } => SessionPhase::Starting,
            SessionState::InProgress(_) => SessionPhase::InProgress,
            SessionState::Completed { .. } => SessionPhase::Completed,
            SessionState::Error { .. } => SessionPhase::Error,
        }
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        match &self.state {
            SessionState::InProgress(attempt) => Some(attempt),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        let phase = self.phase();
        log::warn!("quiz session: rejected '{}' in {:?}", action, phase);
        SessionError::InvalidTransition { action, phase }
    }

    fn attempt_mut(&mut self, action: &'static str) -> Result<&mut Attempt, SessionError> {
        if !matches!(self.state, SessionState::InProgress(_)) {
            return Err(self.invalid(action));
        }
        match &mut self.state {
            SessionState::InProgress(attempt) => Ok(attempt),
            _ => Err(SessionError::InvalidTransition {
                action,
                phase: SessionPhase::InProgress,
            }),
        }
    }

    /// Quiz metadata arrived (without questions)
    pub fn loaded(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        if self.phase() != SessionPhase::Loading {
            return Err(self.invalid("load"));
        }
        log::debug!("quiz session: quiz {} loaded", quiz.id);
        self.state = SessionState::Ready { quiz, notice: None };
        Ok(())
    }

    /// The quiz itself could not be fetched; terminal for this page
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("quiz session: {}", message);
        self.state = SessionState::Error { message };
    }

    /// Eligibility of the loaded quiz at `now`, while it can still be started
    pub fn eligibility(&self, now: DateTime<Utc>) -> Option<Eligibility> {
        match &self.state {
            SessionState::Ready { quiz, .. } => Some(eligibility::check(quiz, now)),
            _ => None,
        }
    }

    /// `Ready -> Starting` when the availability window is open
    pub fn begin_start(&mut self, now: DateTime<Utc>) -> Result<QuizId, SessionError> {
        if self.phase() != SessionPhase::Ready {
            return Err(self.invalid("start"));
        }
        let SessionState::Ready { quiz, notice } = &mut self.state else {
            return Err(SessionError::InvalidTransition {
                action: "start",
                phase: SessionPhase::Ready,
            });
        };
        let eligibility = eligibility::check(quiz, now);
        if let Some(message) = eligibility.message() {
            *notice = Some(message.clone());
            return Err(SessionError::NotEligible(message));
        }
        let quiz = quiz.clone();
        let quiz_id = quiz.id;
        log::debug!("quiz session: starting quiz {}", quiz_id);
        self.state = SessionState::Starting { quiz };
        Ok(quiz_id)
    }

    /// `Starting -> Ready`; the learner may try again
    pub fn start_rejected(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        let SessionState::Starting { quiz } = &self.state else {
            return Err(self.invalid("reject start"));
        };
        let message = message.into();
        log::warn!("quiz session: start of quiz {} failed: {}", quiz.id, message);
        self.state = SessionState::Ready {
            quiz: quiz.clone(),
            notice: Some(message),
        };
        Ok(())
    }

    /// `Starting -> InProgress` with the full quiz, questions included
    pub fn started(
        &mut self,
        quiz: Quiz,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.phase() != SessionPhase::Starting {
            return Err(self.invalid("begin attempt"));
        }
        let countdown = quiz
            .time_limit_secs()
            .map(|limit| Countdown::new(now, limit));
        log::debug!(
            "quiz session: attempt on quiz {} started, {} questions, limit {:?}s",
            quiz.id,
            quiz.questions.len(),
            quiz.time_limit_secs()
        );
        self.state = SessionState::InProgress(Attempt {
            quiz,
            user_id: user_id.into(),
            started_at: now,
            countdown,
            answers: BTreeMap::new(),
            submitting: None,
            auto_submit_fired: false,
            last_error: None,
        });
        Ok(())
    }

    /// Last write wins
    pub fn answer(&mut self, question_id: QuestionId, value: AnswerValue) -> Result<(), SessionError> {
        let attempt = self.attempt_mut("answer")?;
        if attempt.submitting.is_some() {
            return Err(SessionError::AlreadySubmitting);
        }
        if attempt.quiz.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        attempt.answers.insert(question_id, value);
        Ok(())
    }

    /// Drop the answer of one question
    pub fn clear_answer(&mut self, question_id: QuestionId) -> Result<(), SessionError> {
        let attempt = self.attempt_mut("clear answer")?;
        if attempt.submitting.is_some() {
            return Err(SessionError::AlreadySubmitting);
        }
        attempt.answers.remove(&question_id);
        Ok(())
    }

    /// Recompute remaining time; fires the timeout submission at most once
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        let SessionState::InProgress(attempt) = &mut self.state else {
            return Tick::Idle;
        };
        let Some(countdown) = attempt.countdown else {
            return Tick::Idle;
        };
        let remaining_secs = countdown.remaining_secs(now);
        if !countdown.is_expired(now) || attempt.auto_submit_fired || attempt.submitting.is_some()
        {
            return Tick::Running { remaining_secs };
        }
        attempt.auto_submit_fired = true;
        attempt.submitting = Some(SubmitTrigger::Timeout);
        log::info!(
            "quiz session: time is up on quiz {}, submitting {} answers",
            attempt.quiz.id,
            attempt.answers.len()
        );
        Tick::AutoSubmit(attempt.plan(SubmitTrigger::Timeout))
    }

    /// Manual submission; gaps in the answers are allowed
    pub fn begin_submit(&mut self) -> Result<SubmitPlan, SessionError> {
        let attempt = self.attempt_mut("submit")?;
        if attempt.submitting.is_some() {
            return Err(SessionError::AlreadySubmitting);
        }
        attempt.submitting = Some(SubmitTrigger::Manual);
        attempt.last_error = None;
        Ok(attempt.plan(SubmitTrigger::Manual))
    }

    /// Submit call failed; answers stay, the learner can retry
    pub fn submit_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        let attempt = self.attempt_mut("fail submission")?;
        if attempt.submitting.take().is_none() {
            return Err(SessionError::InvalidTransition {
                action: "fail submission",
                phase: SessionPhase::InProgress,
            });
        }
        let message = message.into();
        log::warn!("quiz session: submission failed: {}", message);
        attempt.last_error = Some(message);
        Ok(())
    }

    /// `InProgress -> Completed`
    pub fn submitted(&mut self, result: QuizResult) -> Result<(), SessionError> {
        match self.attempt() {
            Some(attempt) if attempt.submitting.is_some() => {}
            _ => return Err(self.invalid("complete")),
        }
        let SessionState::InProgress(attempt) =
            std::mem::replace(&mut self.state, SessionState::Loading)
        else {
            return Err(SessionError::InvalidTransition {
                action: "complete",
                phase: SessionPhase::InProgress,
            });
        };
        log::debug!(
            "quiz session: quiz {} completed, score {}/{}",
            attempt.quiz.id,
            result.score,
            result.total_questions
        );
        self.state = SessionState::Completed {
            quiz: attempt.quiz,
            result,
            answers: attempt.answers,
        };
        Ok(())
    }

    pub fn snapshot(&self, now: DateTime<Utc>, warning_threshold_secs: i64) -> SessionSnapshot {
        let phase = self.phase();
        match &self.state {
            SessionState::Loading => SessionSnapshot::default(),
            SessionState::Ready { quiz, notice } => {
                let eligibility = eligibility::check(quiz, now);
                SessionSnapshot {
                    phase,
                    quiz: Some(quiz.clone()),
                    notice: notice.clone().or_else(|| eligibility.message()),
                    eligibility: Some(eligibility),
                    ..SessionSnapshot::default()
                }
            }
            SessionState::Starting { quiz } => SessionSnapshot {
                phase,
                quiz: Some(quiz.clone()),
                ..SessionSnapshot::default()
            },
            SessionState::InProgress(attempt) => SessionSnapshot {
                phase,
                quiz: Some(attempt.quiz.clone()),
                notice: attempt.last_error.clone(),
                remaining_secs: attempt.countdown.map(|c| c.remaining_secs(now)),
                urgency: attempt
                    .countdown
                    .map(|c| c.urgency(now, warning_threshold_secs)),
                answered: attempt.answered_count(),
                total: attempt.quiz.questions.len(),
                submitting: attempt.submitting.is_some(),
                overdue: attempt.auto_submit_fired
                    || attempt.countdown.map(|c| c.is_expired(now)).unwrap_or(false),
                ..SessionSnapshot::default()
            },
            SessionState::Completed {
                quiz,
                result,
                answers,
            } => SessionSnapshot {
                phase,
                quiz: Some(quiz.clone()),
                answered: answers.values().filter(|a| !a.is_empty()).count(),
                total: quiz.questions.len(),
                result: Some(result.clone()),
                ..SessionSnapshot::default()
            },
            SessionState::Error { message } => SessionSnapshot {
                phase,
                notice: Some(message.clone()),
                ..SessionSnapshot::default()
            },
        }
    }
}
