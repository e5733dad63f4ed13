use async_trait::async_trait;
use contracts::domain::a001_quiz::{Quiz, QuizId, QuizResult, SubmitQuizRequest};
use serde_json::Value;

use crate::shared::api_utils::endpoint;
use crate::system::http::{ApiClient, ApiError};

const QUIZZES: &str = "/api/quizzes";
const QUIZ: &str = "/api/quizzes/{id}";
const START: &str = "/api/quizzes/{id}/start/{userId}";
const SUBMIT: &str = "/api/quizzes/{id}/submit";

/// Quiz endpoints used by the learner flow
#[async_trait(?Send)]
pub trait QuizApi {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError>;

    /// Preview form, without questions
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError>;

    async fn start_quiz(&self, id: QuizId, user_id: &str) -> Result<(), ApiError>;

    /// Full form; only served once the attempt is started
    async fn fetch_quiz_with_questions(&self, id: QuizId) -> Result<Quiz, ApiError>;

    async fn submit_quiz(
        &self,
        id: QuizId,
        request: &SubmitQuizRequest,
    ) -> Result<QuizResult, ApiError>;
}

#[derive(Clone)]
pub struct RemoteQuizApi {
    client: ApiClient,
}

impl RemoteQuizApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn quiz_path(template: &str, id: QuizId) -> String {
    endpoint(template, &[("id", &id.to_string())])
}

/// The start call answers with a flag or an object; only an explicit "no" is a refusal
fn start_accepted(result: &Value) -> bool {
    match result {
        Value::Bool(ok) => *ok,
        Value::Object(map) => map.get("success").and_then(Value::as_bool).unwrap_or(true),
        _ => true,
    }
}

#[async_trait(?Send)]
impl QuizApi for RemoteQuizApi {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        self.client.get(QUIZZES).await
    }

    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        self.client.get(&quiz_path(QUIZ, id)).await
    }

    async fn start_quiz(&self, id: QuizId, user_id: &str) -> Result<(), ApiError> {
        let path = endpoint(START, &[("id", &id.to_string()), ("userId", user_id)]);
        let result: Value = self.client.post(&path, &Value::Null).await?;
        if start_accepted(&result) {
            Ok(())
        } else {
            let message = result
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("The quiz could not be started")
                .to_string();
            Err(ApiError::Application {
                status: None,
                code: None,
                message,
            })
        }
    }

    async fn fetch_quiz_with_questions(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let quiz: Quiz = self.client.get(&quiz_path(QUIZ, id)).await?;
        log::debug!("quiz {}: fetched {} questions", id, quiz.questions.len());
        Ok(quiz)
    }

    async fn submit_quiz(
        &self,
        id: QuizId,
        request: &SubmitQuizRequest,
    ) -> Result<QuizResult, ApiError> {
        self.client.post(&quiz_path(SUBMIT, id), request).await
    }
}
