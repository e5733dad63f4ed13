use std::rc::Rc;

use contracts::domain::a001_quiz::QuizId;

use crate::domain::a001_quiz::api::RemoteQuizApi;
use crate::domain::a001_quiz::runner::{QuizRunner, SystemClock};
use crate::system::auth::context::AppServices;

pub type TakeRunner = QuizRunner<RemoteQuizApi>;

pub fn build_runner(services: &AppServices, quiz_id: QuizId, user_id: String) -> Rc<TakeRunner> {
    Rc::new(QuizRunner::new(
        RemoteQuizApi::new(services.client.clone()),
        Rc::new(SystemClock),
        quiz_id,
        user_id,
        services.config.warning_threshold_secs,
    ))
}

/// Seed for the matching column shuffle; differs per visit
pub fn shuffle_seed(quiz_id: QuizId) -> u64 {
    (js_sys::Date::now() as u64) ^ (quiz_id as u64).rotate_left(32)
}
