//! Drives a `QuizSession` against the quiz endpoints.
//!
//! The session lives in a `RefCell`; no borrow is held across an await, so
//! timer ticks and clicks arriving mid-call see a consistent state.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use contracts::domain::a001_quiz::{AnswerValue, QuestionId, QuizId};

use super::api::QuizApi;
use super::capture::AnswerChange;
use super::session::{QuizSession, SessionError, SessionPhase, SessionSnapshot, SubmitPlan, Tick};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct QuizRunner<A: QuizApi> {
    api: A,
    clock: Rc<dyn Clock>,
    quiz_id: QuizId,
    user_id: String,
    warning_threshold_secs: i64,
    session: RefCell<QuizSession>,
}

impl<A: QuizApi> QuizRunner<A> {
    pub fn new(
        api: A,
        clock: Rc<dyn Clock>,
        quiz_id: QuizId,
        user_id: impl Into<String>,
        warning_threshold_secs: i64,
    ) -> Self {
        Self {
            api,
            clock,
            quiz_id,
            user_id: user_id.into(),
            warning_threshold_secs,
            session: RefCell::new(QuizSession::new()),
        }
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.borrow().phase()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session
            .borrow()
            .snapshot(self.clock.now(), self.warning_threshold_secs)
    }

    /// Fetch the quiz preview; failure is fatal for the page
    pub async fn load(&self) {
        match self.api.fetch_quiz(self.quiz_id).await {
            Ok(quiz) => {
                if let Err(e) = self.session.borrow_mut().loaded(quiz) {
                    log::warn!("quiz {}: {}", self.quiz_id, e);
                }
            }
            Err(e) => self.session.borrow_mut().fail(e.to_string()),
        }
    }

    /// `Ready -> Starting`; call `finish_start` with the returned id
    pub fn begin_start(&self) -> Result<QuizId, SessionError> {
        self.session.borrow_mut().begin_start(self.clock.now())
    }

    /// Start call plus the fetch of the questions.
    ///
    /// A refused start goes back to `Ready` with a notice; failing to fetch
    /// the questions afterwards is fatal.
    pub async fn finish_start(&self, quiz_id: QuizId) -> Result<(), SessionError> {
        if let Err(e) = self.api.start_quiz(quiz_id, &self.user_id).await {
            return self.session.borrow_mut().start_rejected(e.to_string());
        }

        match self.api.fetch_quiz_with_questions(quiz_id).await {
            Ok(quiz) if quiz.questions.is_empty() => self
                .session
                .borrow_mut()
                .start_rejected("This quiz has no questions yet"),
            Ok(quiz) => self
                .session
                .borrow_mut()
                .started(quiz, self.user_id.clone(), self.clock.now()),
            Err(e) => {
                self.session.borrow_mut().fail(e.to_string());
                Ok(())
            }
        }
    }

    pub async fn start(&self) -> Result<(), SessionError> {
        let quiz_id = self.begin_start()?;
        self.finish_start(quiz_id).await
    }

    pub fn answer(&self, question_id: QuestionId, value: AnswerValue) -> Result<(), SessionError> {
        self.session.borrow_mut().answer(question_id, value)
    }

    pub fn clear_answer(&self, question_id: QuestionId) -> Result<(), SessionError> {
        self.session.borrow_mut().clear_answer(question_id)
    }

    /// Apply an answer change coming from a capture board
    pub fn record(&self, change: &AnswerChange) -> Result<(), SessionError> {
        match &change.answer {
            Some(value) => self.answer(change.question_id, value.clone()),
            None => self.clear_answer(change.question_id),
        }
    }

    /// One timer tick; returns the timeout submission when it must be sent
    pub fn tick(&self) -> Option<SubmitPlan> {
        match self.session.borrow_mut().tick(self.clock.now()) {
            Tick::AutoSubmit(plan) => Some(plan),
            Tick::Idle | Tick::Running { .. } => None,
        }
    }

    /// Record a manual submission; send it with `complete_submission`
    pub fn begin_submit(&self) -> Result<SubmitPlan, SessionError> {
        self.session.borrow_mut().begin_submit()
    }

    pub async fn submit(&self) -> Result<(), SessionError> {
        let plan = self.begin_submit()?;
        self.complete_submission(plan).await
    }

    /// Send a submission already recorded in the session
    pub async fn complete_submission(&self, plan: SubmitPlan) -> Result<(), SessionError> {
        match self.api.submit_quiz(plan.quiz_id, &plan.request).await {
            Ok(result) => self.session.borrow_mut().submitted(result),
            Err(e) if e.is_retryable() => self
                .session
                .borrow_mut()
                .submit_failed(format!(
                    "{}. Your answers are kept, submit again.",
                    e.to_string().trim_end_matches('.')
                )),
            Err(e) => self.session.borrow_mut().submit_failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_quiz::testing::quiz_fixture;
    use crate::system::http::ApiError;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use contracts::domain::a001_quiz::{Quiz, QuizResult, QuizType, SubmitQuizRequest};
    use futures::executor::block_on;
    use std::cell::Cell;

    struct ManualClock(Cell<DateTime<Utc>>);

    impl ManualClock {
        pub fn at(now: DateTime<Utc>) -> Rc<Self> {
            Rc::new(Self(Cell::new(now)))
        }

        pub fn advance(&self, secs: i64) {
            self.0.set(self.0.get() + Duration::seconds(secs));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct FakeApi {
        quiz: Option<Quiz>,
        fail_start: bool,
        fail_full_fetch: bool,
        fail_submits: Cell<u32>,
        starts: Cell<u32>,
        submits: RefCell<Vec<SubmitQuizRequest>>,
    }

    fn server_error() -> ApiError {
        ApiError::from_status(500, None, None)
    }

    #[async_trait(?Send)]
    impl QuizApi for FakeApi {
        async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
            Ok(self.quiz.clone().into_iter().collect())
        }

        async fn fetch_quiz(&self, _id: QuizId) -> Result<Quiz, ApiError> {
            let mut quiz = self
                .quiz
                .clone()
                .ok_or_else(|| ApiError::from_status(404, None, None))?;
            quiz.questions.clear();
            Ok(quiz)
        }

        async fn start_quiz(&self, _id: QuizId, _user_id: &str) -> Result<(), ApiError> {
            self.starts.set(self.starts.get() + 1);
            if self.fail_start {
                Err(server_error())
            } else {
                Ok(())
            }
        }

        async fn fetch_quiz_with_questions(&self, _id: QuizId) -> Result<Quiz, ApiError> {
            if self.fail_full_fetch {
                return Err(server_error());
            }
            self.quiz.clone().ok_or_else(server_error)
        }

        async fn submit_quiz(
            &self,
            _id: QuizId,
            request: &SubmitQuizRequest,
        ) -> Result<QuizResult, ApiError> {
            self.submits.borrow_mut().push(request.clone());
            if self.fail_submits.get() > 0 {
                self.fail_submits.set(self.fail_submits.get() - 1);
                return Err(server_error());
            }
            Ok(QuizResult {
                score: request.answers.len() as f64,
                total_questions: 2,
                completed_at: None,
            })
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn make_runner(api: FakeApi) -> (QuizRunner<FakeApi>, Rc<ManualClock>) {
        let clock = ManualClock::at(t0());
        (QuizRunner::new(api, clock.clone(), 42, "u1", 300), clock)
    }

    #[test]
    fn test_load_failure_is_fatal() {
        let (runner, _) = make_runner(FakeApi::default());
        block_on(runner.load());
        let snapshot = runner.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Error);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Requested resource was not found")
        );
    }

    #[test]
    fn test_full_flow() {
        let (runner, _) = make_runner(FakeApi {
            quiz: Some(quiz_fixture(QuizType::MultipleChoice, 2)),
            ..FakeApi::default()
        });
        block_on(runner.load());
        assert_eq!(runner.phase(), SessionPhase::Ready);
        assert!(runner.snapshot().quiz.unwrap().questions.is_empty());

        block_on(runner.start()).unwrap();
        assert_eq!(runner.phase(), SessionPhase::InProgress);
        assert_eq!(runner.snapshot().total, 2);

        runner
            .answer(1, AnswerValue::Text("option 1-a".into()))
            .unwrap();
        block_on(runner.submit()).unwrap();
        let snapshot = runner.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Completed);
        assert_eq!(snapshot.result.map(|r| r.score), Some(1.0));
    }

    #[test]
    fn test_start_failure_returns_to_ready() {
        let (runner, _) = make_runner(FakeApi {
            quiz: Some(quiz_fixture(QuizType::Matching, 2)),
            fail_start: true,
            ..FakeApi::default()
        });
        block_on(runner.load());
        block_on(runner.start()).unwrap();
        let snapshot = runner.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Ready);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Server error, please try again later")
        );
    }

    #[test]
    fn test_full_quiz_fetch_failure_is_fatal() {
        let (runner, _) = make_runner(FakeApi {
            quiz: Some(quiz_fixture(QuizType::Matching, 2)),
            fail_full_fetch: true,
            ..FakeApi::default()
        });
        block_on(runner.load());
        block_on(runner.start()).unwrap();
        assert_eq!(runner.phase(), SessionPhase::Error);
    }

    #[test]
    fn test_quiz_without_questions_cannot_start() {
        let (runner, _) = make_runner(FakeApi {
            quiz: Some(quiz_fixture(QuizType::Matching, 0)),
            ..FakeApi::default()
        });
        block_on(runner.load());
        block_on(runner.start()).unwrap();
        assert_eq!(runner.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_ineligible_quiz_never_calls_start() {
        let mut quiz = quiz_fixture(QuizType::MultipleChoice, 1);
        quiz.start_time = Some(t0() + Duration::days(1));
        let (runner, _) = make_runner(FakeApi {
            quiz: Some(quiz),
            ..FakeApi::default()
        });
        block_on(runner.load());
        assert!(matches!(
            block_on(runner.start()),
            Err(SessionError::NotEligible(_))
        ));
        assert_eq!(runner.api.starts.get(), 0);
    }

    #[test]
    fn test_submit_failure_keeps_answers_for_retry() {
        let api = FakeApi {
            quiz: Some(quiz_fixture(QuizType::FillInBlank, 2)),
            ..FakeApi::default()
        };
        api.fail_submits.set(1);
        let (runner, _) = make_runner(api);
        block_on(runner.load());
        block_on(runner.start()).unwrap();
        runner.answer(2, AnswerValue::Text("w2".into())).unwrap();

        block_on(runner.submit()).unwrap();
        let snapshot = runner.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::InProgress);
        assert!(snapshot.notice.is_some());
        assert_eq!(snapshot.answered, 1);

        block_on(runner.submit()).unwrap();
        assert_eq!(runner.phase(), SessionPhase::Completed);
        let submits = runner.api.submits.borrow();
        assert_eq!(submits.len(), 2);
        assert_eq!(submits[0], submits[1]);
    }

    #[test]
    fn test_timeout_submits_once_with_partial_answers() {
        let mut quiz = quiz_fixture(QuizType::MultipleChoice, 2);
        quiz.timed = true;
        quiz.duration_in_minutes = Some(1);
        let (runner, clock) = make_runner(FakeApi {
            quiz: Some(quiz),
            ..FakeApi::default()
        });
        block_on(runner.load());
        block_on(runner.start()).unwrap();
        runner
            .answer(1, AnswerValue::Text("option 1-b".into()))
            .unwrap();

        let mut plans = Vec::new();
        for _ in 0..65 {
            clock.advance(1);
            if let Some(plan) = runner.tick() {
                plans.push(plan);
            }
        }
        assert_eq!(plans.len(), 1);
        block_on(runner.complete_submission(plans.remove(0))).unwrap();
        assert_eq!(runner.phase(), SessionPhase::Completed);
        assert_eq!(runner.api.submits.borrow()[0].answers.len(), 1);
        assert_eq!(runner.tick(), None);
    }

    #[test]
    fn test_answers_refused_while_submitting() {
        let (runner, _) = make_runner(FakeApi {
            quiz: Some(quiz_fixture(QuizType::FillInBlank, 2)),
            ..FakeApi::default()
        });
        block_on(runner.load());
        block_on(runner.start()).unwrap();
        runner
            .record(&AnswerChange::set(1, AnswerValue::Text("w1".into())))
            .unwrap();

        let plan = runner.begin_submit().unwrap();
        assert!(!runner.snapshot().accepts_answers());
        assert_eq!(
            runner.record(&AnswerChange::set(2, AnswerValue::Text("w2".into()))),
            Err(SessionError::AlreadySubmitting)
        );
        assert_eq!(
            runner.record(&AnswerChange::clear(1)),
            Err(SessionError::AlreadySubmitting)
        );
        assert_eq!(plan.request.answers.len(), 1);
    }

    #[test]
    fn test_failed_timeout_submission_can_be_retried_by_hand() {
        let mut quiz = quiz_fixture(QuizType::Matching, 2);
        quiz.timed = true;
        quiz.duration_in_minutes = Some(1);
        let api = FakeApi {
            quiz: Some(quiz),
            ..FakeApi::default()
        };
        api.fail_submits.set(1);
        let (runner, clock) = make_runner(api);
        block_on(runner.load());
        block_on(runner.start()).unwrap();

        clock.advance(61);
        let plan = runner.tick().unwrap();
        block_on(runner.complete_submission(plan)).unwrap();

        let snapshot = runner.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::InProgress);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Server error, please try again later. Your answers are kept, submit again.")
        );
        // nothing answered, yet the learner must be able to hand in
        assert!(snapshot.can_submit(false));
        assert_eq!(runner.tick(), None);

        block_on(runner.submit()).unwrap();
        assert_eq!(runner.phase(), SessionPhase::Completed);
    }
}
