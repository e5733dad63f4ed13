//! Matching capture.
//!
//! Left column: the quiz questions. Right column: every question's correct
//! answer, deduplicated and shuffled once per session. A right-hand value
//! can be paired with at most one question at a time.

use std::collections::BTreeMap;

use contracts::domain::a001_quiz::{AnswerValue, Question, QuestionId, Quiz, QuizType};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::AnswerCapture;

/// What a click did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    Selected(QuestionId),
    Deselected,
    Paired { question_id: QuestionId, value: String },
    Unpaired { question_id: QuestionId },
    Ignored,
}

/// Distinct correct answers in first-seen order
///
/// Values are kept as stored so a pairing submits the exact answer text;
/// surrounding whitespace only matters for blank and duplicate detection.
pub fn candidate_pool(questions: &[Question]) -> Vec<String> {
    let mut pool: Vec<String> = Vec::new();
    for question in questions {
        let key = question.answer.trim();
        if !key.is_empty() && !pool.iter().any(|p| p.trim() == key) {
            pool.push(question.answer.clone());
        }
    }
    pool
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchingBoard {
    questions: Vec<QuestionId>,
    candidates: Vec<String>,
    pairs: BTreeMap<QuestionId, String>,
    selected_left: Option<QuestionId>,
}

impl MatchingBoard {
    pub fn new(quiz: &Quiz, shuffle_seed: u64) -> Self {
        let mut candidates = candidate_pool(&quiz.questions);
        let mut rng = SmallRng::seed_from_u64(shuffle_seed);
        candidates.shuffle(&mut rng);
        Self {
            questions: quiz.questions.iter().map(|q| q.id).collect(),
            candidates,
            pairs: BTreeMap::new(),
            selected_left: None,
        }
    }

    /// Shuffled right-hand column, including paired values
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected_left(&self) -> Option<QuestionId> {
        self.selected_left
    }

    pub fn pair_of(&self, question_id: QuestionId) -> Option<&str> {
        self.pairs.get(&question_id).map(String::as_str)
    }

    pub fn is_taken(&self, value: &str) -> bool {
        self.pairs.values().any(|v| v == value)
    }

    /// Right-hand values still free to pair
    pub fn available(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .map(String::as_str)
            .filter(|c| !self.is_taken(c))
            .collect()
    }

    pub fn unmatched_candidates(&self) -> usize {
        self.available().len()
    }

    /// Click on a question: select it, deselect it, or undo its pairing
    pub fn select_left(&mut self, question_id: QuestionId) -> MatchEvent {
        if !self.questions.contains(&question_id) {
            return MatchEvent::Ignored;
        }
        if self.pairs.remove(&question_id).is_some() {
            self.selected_left = None;
            return MatchEvent::Unpaired { question_id };
        }
        if self.selected_left == Some(question_id) {
            self.selected_left = None;
            return MatchEvent::Deselected;
        }
        self.selected_left = Some(question_id);
        MatchEvent::Selected(question_id)
    }

    /// Click on a right-hand value: pair it with the selected question
    pub fn select_right(&mut self, value: &str) -> MatchEvent {
        let Some(question_id) = self.selected_left else {
            return MatchEvent::Ignored;
        };
        if !self.candidates.iter().any(|c| c == value) || self.is_taken(value) {
            return MatchEvent::Ignored;
        }
        self.pairs.insert(question_id, value.to_string());
        self.selected_left = None;
        MatchEvent::Paired {
            question_id,
            value: value.to_string(),
        }
    }
}

impl AnswerCapture for MatchingBoard {
    fn quiz_type(&self) -> QuizType {
        QuizType::Matching
    }

    fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.clone()
    }

    fn current_answer(&self, question_id: QuestionId) -> Option<AnswerValue> {
        self.pair_of(question_id)
            .map(|v| AnswerValue::Text(v.to_string()))
    }

    /// Presence in the pairing map
    fn is_answered(&self, question_id: QuestionId) -> bool {
        self.pairs.contains_key(&question_id)
    }
}
