use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::datetime;

pub type QuizId = i64;
pub type QuestionId = i64;

// ============================================================================
// Quiz
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizType {
    MultipleChoice,
    FillInBlank,
    Matching,
}

impl QuizType {
    pub fn label(&self) -> &'static str {
        match self {
            QuizType::MultipleChoice => "Multiple choice",
            QuizType::FillInBlank => "Fill in the blank",
            QuizType::Matching => "Matching",
        }
    }
}

/// Lesson the quiz belongs to, as embedded in quiz payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
    #[serde(default)]
    pub lesson: Option<LessonRef>,
    /// Creator as sent by the server; display only
    #[serde(default)]
    pub created_by: Option<serde_json::Value>,
    #[serde(default)]
    pub timed: bool,
    #[serde(default)]
    pub duration_in_minutes: Option<u32>,
    #[serde(default, with = "datetime::optional")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "datetime::optional")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempt_limit: Option<u32>,
    /// Empty until the attempt has been started
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Countdown length, if the quiz is timed and declares a duration
    pub fn time_limit_secs(&self) -> Option<i64> {
        if !self.timed {
            return None;
        }
        self.duration_in_minutes.map(|m| i64::from(m) * 60)
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    /// Encoding depends on the quiz type
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Explicit multi-select flag; when absent the client guesses from the options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multi_select: Option<bool>,
}

// ============================================================================
// Answers and submission
// ============================================================================

/// A learner's answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    /// Ordered selections (multi-select) or pairings
    Choices(Vec<String>),
}

impl AnswerValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.trim().is_empty(),
            AnswerValue::Choices(items) => items.is_empty(),
        }
    }

    /// Single-string form sent to the server; lists are comma-joined
    pub fn to_wire_string(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Choices(items) => items.join(","),
        }
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Choices(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub user_id: String,
    pub answers: BTreeMap<QuestionId, String>,
}

impl SubmitQuizRequest {
    pub fn new(user_id: impl Into<String>, answers: &BTreeMap<QuestionId, AnswerValue>) -> Self {
        Self {
            user_id: user_id.into(),
            answers: answers
                .iter()
                .map(|(id, value)| (*id, value.to_wire_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: f64,
    pub total_questions: u32,
    #[serde(default, with = "datetime::optional")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizResult {
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        (self.score / f64::from(self.total_questions) * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_quiz_without_questions() {
        let body = r#"{
            "id": 12,
            "title": "HSK1 Lesson 3",
            "type": "FILL_IN_BLANK",
            "timed": true,
            "durationInMinutes": 15,
            "startTime": "2025-03-01T09:00:00",
            "endTime": null
        }"#;
        let quiz: Quiz = serde_json::from_str(body).unwrap();
        assert_eq!(quiz.quiz_type, QuizType::FillInBlank);
        assert!(quiz.questions.is_empty());
        assert!(quiz.start_time.is_some());
        assert!(quiz.end_time.is_none());
        assert_eq!(quiz.time_limit_secs(), Some(900));
    }

    #[test]
    fn test_untimed_quiz_has_no_limit() {
        let body = r#"{"id": 1, "title": "t", "type": "MATCHING", "durationInMinutes": 10}"#;
        let quiz: Quiz = serde_json::from_str(body).unwrap();
        assert_eq!(quiz.time_limit_secs(), None);
    }

    #[test]
    fn test_submit_request_joins_lists() {
        let mut answers = BTreeMap::new();
        answers.insert(2, AnswerValue::Choices(vec!["b".into(), "a".into()]));
        answers.insert(1, AnswerValue::Text("你好".into()));
        let request = SubmitQuizRequest::new("u7", &answers);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], "u7");
        assert_eq!(json["answers"]["1"], "你好");
        assert_eq!(json["answers"]["2"], "b,a");
    }

    #[test]
    fn test_answer_value_emptiness() {
        assert!(AnswerValue::Text("  ".into()).is_empty());
        assert!(AnswerValue::Choices(vec![]).is_empty());
        assert!(!AnswerValue::Choices(vec!["x".into()]).is_empty());
    }

    #[test]
    fn test_result_percentage() {
        let result = QuizResult {
            score: 7.0,
            total_questions: 10,
            completed_at: None,
        };
        assert!((result.percentage() - 70.0).abs() < f64::EPSILON);
    }
}
