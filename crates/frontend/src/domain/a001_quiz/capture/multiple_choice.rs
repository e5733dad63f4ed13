//! Multiple-choice capture: radio selection, promoted to checkboxes for
//! questions that look like multi-answer ones.

use contracts::domain::a001_quiz::{AnswerValue, Question, QuestionId, Quiz, QuizType};

use super::AnswerCapture;

/// More options than this suggests a multi-answer question
const SINGLE_SELECT_MAX_OPTIONS: usize = 4;

const MULTI_ANSWER_HINTS: [&str; 3] = ["all of the above", "both", "multiple"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

/// Explicit server flag first, then the option-count / wording heuristic
pub fn selection_mode(question: &Question) -> SelectionMode {
    if let Some(multi) = question.is_multi_select {
        return if multi {
            SelectionMode::Multi
        } else {
            SelectionMode::Single
        };
    }
    let hinted = question.options.iter().any(|option| {
        let lower = option.to_lowercase();
        MULTI_ANSWER_HINTS.iter().any(|hint| lower.contains(hint))
    });
    if question.options.len() > SINGLE_SELECT_MAX_OPTIONS || hinted {
        SelectionMode::Multi
    } else {
        SelectionMode::Single
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceModel {
    pub question_id: QuestionId,
    pub mode: SelectionMode,
    pub options: Vec<String>,
    /// Click order, not option order
    selected: Vec<String>,
    touched: bool,
}

impl ChoiceModel {
    pub fn new(question: &Question) -> Self {
        Self {
            question_id: question.id,
            mode: selection_mode(question),
            options: question.options.clone(),
            selected: Vec::new(),
            touched: false,
        }
    }

    /// Radio: replace the selection. Checkbox: toggle, keeping click order.
    pub fn select(&mut self, option: &str) {
        if !self.options.iter().any(|o| o == option) {
            return;
        }
        self.touched = true;
        match self.mode {
            SelectionMode::Single => {
                self.selected = vec![option.to_string()];
            }
            SelectionMode::Multi => {
                if let Some(pos) = self.selected.iter().position(|s| s == option) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(option.to_string());
                }
            }
        }
    }

    pub fn is_selected(&self, option: &str) -> bool {
        self.selected.iter().any(|s| s == option)
    }

    pub fn answer(&self) -> Option<AnswerValue> {
        if !self.touched {
            return None;
        }
        match self.mode {
            SelectionMode::Single => self.selected.first().cloned().map(AnswerValue::Text),
            SelectionMode::Multi => Some(AnswerValue::Choices(self.selected.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipleChoiceCapture {
    models: Vec<ChoiceModel>,
}

impl MultipleChoiceCapture {
    pub fn new(quiz: &Quiz) -> Self {
        Self {
            models: quiz.questions.iter().map(ChoiceModel::new).collect(),
        }
    }

    pub fn model(&self, question_id: QuestionId) -> Option<&ChoiceModel> {
        self.models.iter().find(|m| m.question_id == question_id)
    }

    /// Apply a click; returns the answer to record
    pub fn select(&mut self, question_id: QuestionId, option: &str) -> Option<AnswerValue> {
        let model = self
            .models
            .iter_mut()
            .find(|m| m.question_id == question_id)?;
        model.select(option);
        model.answer()
    }
}

impl AnswerCapture for MultipleChoiceCapture {
    fn quiz_type(&self) -> QuizType {
        QuizType::MultipleChoice
    }

    fn question_ids(&self) -> Vec<QuestionId> {
        self.models.iter().map(|m| m.question_id).collect()
    }

    fn current_answer(&self, question_id: QuestionId) -> Option<AnswerValue> {
        self.model(question_id)?.answer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_quiz::testing::question;

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_four_plain_options_is_single() {
        let q = question(1, "你好 means?", "hello", options(&["hello", "bye", "thanks", "sorry"]));
        assert_eq!(selection_mode(&q), SelectionMode::Single);
    }

    #[test]
    fn test_heuristic_promotes_to_multi() {
        let q = question(1, "?", "", options(&["a", "b", "c", "d", "e"]));
        assert_eq!(selection_mode(&q), SelectionMode::Multi);
        let q = question(1, "?", "", options(&["a", "b", "All of the above"]));
        assert_eq!(selection_mode(&q), SelectionMode::Multi);
        let q = question(1, "?", "", options(&["a", "Both a and c", "c"]));
        assert_eq!(selection_mode(&q), SelectionMode::Multi);
    }

    #[test]
    fn test_explicit_flag_wins() {
        let mut q = question(1, "?", "", options(&["a", "b", "c", "d", "e", "f"]));
        q.is_multi_select = Some(false);
        assert_eq!(selection_mode(&q), SelectionMode::Single);
        q.options.truncate(2);
        q.is_multi_select = Some(true);
        assert_eq!(selection_mode(&q), SelectionMode::Multi);
    }

    #[test]
    fn test_single_select_replaces() {
        let q = question(1, "?", "b", options(&["a", "b", "c"]));
        let mut model = ChoiceModel::new(&q);
        assert_eq!(model.answer(), None);
        model.select("a");
        model.select("b");
        assert_eq!(model.answer(), Some(AnswerValue::Text("b".into())));
        model.select("zzz");
        assert_eq!(model.answer(), Some(AnswerValue::Text("b".into())));
    }

    #[test]
    fn test_multi_select_keeps_click_order() {
        let q = question(1, "?", "", options(&["a", "b", "c", "d", "e"]));
        let mut model = ChoiceModel::new(&q);
        model.select("d");
        model.select("a");
        model.select("c");
        model.select("a");
        assert_eq!(
            model.answer(),
            Some(AnswerValue::Choices(vec!["d".into(), "c".into()]))
        );
        assert_eq!(model.answer().unwrap().to_wire_string(), "d,c");
    }

    #[test]
    fn test_deselecting_everything_leaves_empty_answer() {
        let q = question(1, "?", "", options(&["a", "b", "c", "d", "e"]));
        let mut model = ChoiceModel::new(&q);
        model.select("a");
        model.select("a");
        assert!(model.answer().unwrap().is_empty());
    }
}
