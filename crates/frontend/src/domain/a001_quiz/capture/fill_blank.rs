//! Fill-in-blank capture.
//!
//! Blank markers in the question text are a run of three or more
//! underscores, `[blank]`, or a bracketed run of underscores such as
//! `[___]`. Each marker becomes one positional input; the answer is the
//! inputs joined with the configured delimiter, in marker order.

use contracts::domain::a001_quiz::{AnswerValue, Question, QuestionId, Quiz, QuizType};

use super::AnswerCapture;

const MIN_UNDERSCORE_RUN: usize = 3;
const BLANK_TOKEN: &str = "[blank]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Zero-based blank position
    Blank(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankTemplate {
    pub segments: Vec<Segment>,
    pub blank_count: usize,
}

/// Length in bytes of a blank marker starting at `rest`, if any
fn marker_len(rest: &str) -> Option<usize> {
    if rest.len() >= BLANK_TOKEN.len()
        && rest.is_char_boundary(BLANK_TOKEN.len())
        && rest[..BLANK_TOKEN.len()].eq_ignore_ascii_case(BLANK_TOKEN)
    {
        return Some(BLANK_TOKEN.len());
    }
    if let Some(inner) = rest.strip_prefix('[') {
        let underscores = inner.chars().take_while(|c| *c == '_').count();
        if underscores > 0 && inner[underscores..].starts_with(']') {
            return Some(underscores + 2);
        }
    }
    let underscores = rest.chars().take_while(|c| *c == '_').count();
    if underscores >= MIN_UNDERSCORE_RUN {
        return Some(underscores);
    }
    None
}

/// Split question text into text segments and blanks
pub fn parse_blanks(text: &str) -> BlankTemplate {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut blank_count = 0;
    let mut idx = 0;

    while idx < text.len() {
        let rest = &text[idx..];
        if let Some(len) = marker_len(rest) {
            if !current.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut current)));
            }
            segments.push(Segment::Blank(blank_count));
            blank_count += 1;
            idx += len;
            continue;
        }
        // Copy a whole run of underscores too short to be a blank
        let short_run = rest.chars().take_while(|c| *c == '_').count();
        if short_run > 0 {
            current.push_str(&rest[..short_run]);
            idx += short_run;
            continue;
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        current.push(ch);
        idx += ch.len_utf8();
    }
    if !current.is_empty() {
        segments.push(Segment::Text(current));
    }

    BlankTemplate {
        segments,
        blank_count,
    }
}

/// Join blank values in order
pub fn join_answer(values: &[String], delimiter: &str) -> String {
    values.join(delimiter)
}

/// Split a stored answer into exactly `count` positional values
pub fn split_answer(answer: &str, delimiter: &str, count: usize) -> Vec<String> {
    let mut values: Vec<String> = if answer.is_empty() || delimiter.is_empty() {
        vec![answer.to_string()]
    } else {
        answer.split(delimiter).map(str::to_string).collect()
    };
    values.resize(count, String::new());
    values
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillBlankModel {
    pub question_id: QuestionId,
    pub template: BlankTemplate,
    values: Vec<String>,
    touched: bool,
}

impl FillBlankModel {
    pub fn new(question: &Question) -> Self {
        let template = parse_blanks(&question.question_text);
        let inputs = template.blank_count.max(1);
        Self {
            question_id: question.id,
            template,
            values: vec![String::new(); inputs],
            touched: false,
        }
    }

    /// Inputs to render; a question without markers gets one trailing input
    pub fn input_count(&self) -> usize {
        self.values.len()
    }

    /// Whether the trailing input is needed because the text has no markers
    pub fn needs_trailing_input(&self) -> bool {
        self.template.blank_count == 0
    }

    pub fn value(&self, position: usize) -> &str {
        self.values.get(position).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn set(&mut self, position: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(position) {
            *slot = value.into();
            self.touched = true;
        }
    }

    pub fn clear(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        self.touched = false;
    }

    pub fn is_filled(&self) -> bool {
        self.values.iter().all(|v| !v.trim().is_empty())
    }

    pub fn answer(&self, delimiter: &str) -> Option<AnswerValue> {
        if !self.touched {
            return None;
        }
        Some(AnswerValue::Text(join_answer(&self.values, delimiter)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillBlankCapture {
    delimiter: String,
    models: Vec<FillBlankModel>,
}

impl FillBlankCapture {
    pub fn new(quiz: &Quiz, delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            models: quiz.questions.iter().map(FillBlankModel::new).collect(),
        }
    }

    pub fn model(&self, question_id: QuestionId) -> Option<&FillBlankModel> {
        self.models.iter().find(|m| m.question_id == question_id)
    }

    fn model_mut(&mut self, question_id: QuestionId) -> Option<&mut FillBlankModel> {
        self.models.iter_mut().find(|m| m.question_id == question_id)
    }

    /// Update one blank; returns the answer to record
    ///
    /// The delimiter is stripped from the typed text so the joined answer
    /// still splits back into one value per blank.
    pub fn set(
        &mut self,
        question_id: QuestionId,
        position: usize,
        value: impl Into<String>,
    ) -> Option<AnswerValue> {
        let delimiter = self.delimiter.clone();
        let mut value = value.into();
        if !delimiter.is_empty() {
            value = value.replace(&delimiter, "");
        }
        let model = self.model_mut(question_id)?;
        model.set(position, value);
        model.answer(&delimiter)
    }

    /// Reset every blank of one question
    pub fn clear(&mut self, question_id: QuestionId) {
        if let Some(model) = self.model_mut(question_id) {
            model.clear();
        }
    }
}

impl AnswerCapture for FillBlankCapture {
    fn quiz_type(&self) -> QuizType {
        QuizType::FillInBlank
    }

    fn question_ids(&self) -> Vec<QuestionId> {
        self.models.iter().map(|m| m.question_id).collect()
    }

    fn current_answer(&self, question_id: QuestionId) -> Option<AnswerValue> {
        self.model(question_id)?.answer(&self.delimiter)
    }

    /// Every blank must hold text
    fn is_answered(&self, question_id: QuestionId) -> bool {
        self.model(question_id)
            .map(|m| m.touched && m.is_filled())
            .unwrap_or(false)
    }
}
