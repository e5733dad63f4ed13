use std::rc::Rc;

use contracts::domain::a001_quiz::{AnswerValue, QuestionId, QuizId};
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::model::{self, TakeRunner};
use crate::domain::a001_quiz::capture::{
    AnswerCapture, AnswerChange, CaptureBoard, MatchEvent,
};
use crate::domain::a001_quiz::session::{SessionPhase, SessionSnapshot, SubmitPlan};
use crate::system::auth::context::AppServices;

const TICK_MS: u32 = 1_000;

/// ViewModel for one quiz attempt page
///
/// Async continuations may outlive the page (the learner can go back while
/// a call is in flight); they hold their own runner and stop at the first
/// signal that has been disposed.
#[derive(Clone, Copy)]
pub struct QuizTakeViewModel {
    pub snapshot: RwSignal<SessionSnapshot>,
    /// Built once the questions are known
    pub board: RwSignal<Option<CaptureBoard>>,
    runner: StoredValue<Rc<TakeRunner>, LocalStorage>,
    timer: StoredValue<Option<Interval>, LocalStorage>,
    delimiter: StoredValue<String>,
}

impl QuizTakeViewModel {
    pub fn new(services: &AppServices, quiz_id: QuizId, user_id: String) -> Self {
        Self {
            snapshot: RwSignal::new(SessionSnapshot::default()),
            board: RwSignal::new(None),
            runner: StoredValue::new_local(model::build_runner(services, quiz_id, user_id)),
            timer: StoredValue::new_local(None),
            delimiter: StoredValue::new(services.config.blank_delimiter.clone()),
        }
    }

    fn runner(&self) -> Option<Rc<TakeRunner>> {
        self.runner.try_get_value()
    }

    /// Publish the runner state; false once the page is gone
    fn sync(&self, runner: &TakeRunner) -> bool {
        self.snapshot.try_set(runner.snapshot()).is_none()
    }

    fn refresh(&self) {
        if let Some(runner) = self.runner() {
            self.sync(&runner);
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.snapshot.with(|s| s.phase)
    }

    pub fn load(&self) {
        let Some(runner) = self.runner() else {
            return;
        };
        let vm = *self;
        spawn_local(async move {
            runner.load().await;
            vm.sync(&runner);
        });
    }

    /// The button is disabled while starting; a second click is rejected anyway
    pub fn start_command(&self) {
        let Some(runner) = self.runner() else {
            return;
        };
        let quiz_id = match runner.begin_start() {
            Ok(id) => id,
            Err(e) => {
                log::info!("quiz {}: start refused: {}", runner.quiz_id(), e);
                self.sync(&runner);
                return;
            }
        };
        self.sync(&runner);

        let vm = *self;
        spawn_local(async move {
            if let Err(e) = runner.finish_start(quiz_id).await {
                log::warn!("quiz {}: {}", quiz_id, e);
            }
            if !vm.sync(&runner) {
                log::debug!("quiz {}: page closed while starting", quiz_id);
                return;
            }
            if runner.phase() == SessionPhase::InProgress {
                vm.build_board();
                vm.start_timer();
            }
        });
    }

    fn build_board(&self) {
        let Some(quiz) = self.snapshot.with_untracked(|s| s.quiz.clone()) else {
            return;
        };
        let delimiter = self.delimiter.get_value();
        let board = CaptureBoard::for_quiz(&quiz, &delimiter, model::shuffle_seed(quiz.id));
        self.board.set(Some(board));
    }

    fn start_timer(&self) {
        if self.snapshot.with_untracked(|s| s.remaining_secs.is_none()) {
            return;
        }
        let vm = *self;
        let interval = Interval::new(TICK_MS, move || vm.tick());
        self.timer.set_value(Some(interval));
    }

    /// Dropping the interval cancels it
    pub fn stop_timer(&self) {
        self.timer.try_set_value(None);
    }

    fn tick(&self) {
        let Some(runner) = self.runner() else {
            return;
        };
        let plan = runner.tick();
        self.sync(&runner);
        if let Some(plan) = plan {
            // outside the interval callback, which the stop drops
            let vm = *self;
            spawn_local(async move {
                vm.stop_timer();
                vm.send_submission(runner, plan);
            });
        }
    }

    pub fn submit_command(&self) {
        let Some(runner) = self.runner() else {
            return;
        };
        match runner.begin_submit() {
            Ok(plan) => {
                self.sync(&runner);
                self.send_submission(runner, plan);
            }
            Err(e) => log::info!("submit ignored: {}", e),
        }
    }

    fn send_submission(&self, runner: Rc<TakeRunner>, plan: SubmitPlan) {
        let vm = *self;
        spawn_local(async move {
            if let Err(e) = runner.complete_submission(plan).await {
                log::warn!("quiz {}: {}", runner.quiz_id(), e);
            }
            if vm.sync(&runner) && runner.phase() == SessionPhase::Completed {
                vm.stop_timer();
            }
        });
    }

    /// Apply a board interaction; the session has the last word
    fn edit(&self, interaction: impl FnOnce(&mut CaptureBoard) -> Option<AnswerChange>) {
        if !self.snapshot.with_untracked(SessionSnapshot::accepts_answers) {
            return;
        }
        let Some(runner) = self.runner() else {
            return;
        };
        let mut outcome = Ok(());
        self.board.update(|board| {
            if let Some(board) = board {
                outcome = board.transact(interaction, |change| runner.record(change));
            }
        });
        if let Err(e) = outcome {
            log::warn!("answer change refused: {}", e);
        }
        self.sync(&runner);
    }

    pub fn select_choice(&self, question_id: QuestionId, option: String) {
        self.edit(|board| match board {
            CaptureBoard::MultipleChoice(capture) => capture
                .select(question_id, &option)
                .map(|answer| AnswerChange::set(question_id, answer)),
            _ => None,
        });
    }

    pub fn set_blank(&self, question_id: QuestionId, position: usize, value: String) {
        self.edit(|board| match board {
            CaptureBoard::FillInBlank(capture) => capture
                .set(question_id, position, value)
                .map(|answer| AnswerChange::set(question_id, answer)),
            _ => None,
        });
    }

    pub fn clear_blanks(&self, question_id: QuestionId) {
        self.edit(|board| match board {
            CaptureBoard::FillInBlank(capture) => {
                capture.clear(question_id);
                Some(AnswerChange::clear(question_id))
            }
            _ => None,
        });
    }

    pub fn match_left(&self, question_id: QuestionId) {
        self.edit(|board| match board {
            CaptureBoard::Matching(matching) => match matching.select_left(question_id) {
                MatchEvent::Unpaired { question_id } => Some(AnswerChange::clear(question_id)),
                _ => None,
            },
            _ => None,
        });
    }

    pub fn match_right(&self, value: String) {
        self.edit(|board| match board {
            CaptureBoard::Matching(matching) => match matching.select_right(&value) {
                MatchEvent::Paired { question_id, value } => {
                    Some(AnswerChange::set(question_id, AnswerValue::Text(value)))
                }
                _ => None,
            },
            _ => None,
        });
    }

    /// Capture controls are disabled while a submission is in flight
    pub fn is_locked(&self) -> bool {
        !self.snapshot.with(|s| s.accepts_answers())
    }

    /// Questions the board considers answered
    pub fn answered_count(&self) -> usize {
        self.board.with(|board| {
            board
                .as_ref()
                .map(|b| b.as_capture().answered_count())
                .unwrap_or(0)
        })
    }

    /// Every question answered, or time is up and gaps are allowed
    pub fn is_ready_to_submit(&self) -> bool {
        let complete = self.board.with(|board| {
            board
                .as_ref()
                .map(|b| b.as_capture().is_complete())
                .unwrap_or(false)
        });
        self.snapshot.with(|s| s.can_submit(complete))
    }
}

#[cfg(test)]
mod tests {
    use leptos::reactive::owner::Owner;
    use serde_json::json;

    use super::*;
    use crate::shared::config::AppConfig;
    use crate::system::auth::controller::AuthController;
    use crate::system::auth::storage::{MemoryStorage, SessionStore};
    use crate::system::http::redirect::testing::RecordingRedirect;
    use crate::system::http::transport::testing::{ok_json, ScriptedTransport};
    use crate::system::http::ApiClient;

    fn services() -> AppServices {
        let client = ApiClient::new(
            "http://api",
            ScriptedTransport::new(|_| ok_json(json!(null))),
            SessionStore::new(Rc::new(MemoryStorage::new())),
            Rc::new(RecordingRedirect::new()),
        );
        AppServices {
            config: Rc::new(AppConfig::default()),
            auth: AuthController::new(client.clone()),
            client,
        }
    }

    #[test]
    fn test_late_results_after_page_closed_are_dropped() {
        let owner = Owner::new();
        owner.set();
        let vm = QuizTakeViewModel::new(&services(), 42, "u1".to_string());
        let runner = vm.runner().unwrap();
        assert!(vm.sync(&runner));
        assert_eq!(vm.snapshot.get_untracked().phase, SessionPhase::Loading);

        owner.cleanup();
        assert!(vm.runner().is_none());
        assert!(!vm.sync(&runner));
        vm.refresh();
        vm.stop_timer();
    }
}
