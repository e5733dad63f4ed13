//! Answer capture strategies, one per quiz type.
//!
//! Each strategy owns the per-question interaction state and reports the
//! answer to record in the session after every user action.

pub mod fill_blank;
pub mod matching;
pub mod multiple_choice;

use contracts::domain::a001_quiz::{AnswerValue, QuestionId, Quiz, QuizType};

pub use fill_blank::FillBlankCapture;
pub use matching::{MatchEvent, MatchingBoard};
pub use multiple_choice::{MultipleChoiceCapture, SelectionMode};

pub trait AnswerCapture {
    fn quiz_type(&self) -> QuizType;

    fn question_ids(&self) -> Vec<QuestionId>;

    /// Answer to record, `None` while the question is untouched
    fn current_answer(&self, question_id: QuestionId) -> Option<AnswerValue>;

    fn is_answered(&self, question_id: QuestionId) -> bool {
        self.current_answer(question_id)
            .map(|answer| !answer.is_empty())
            .unwrap_or(false)
    }

    fn answered_count(&self) -> usize {
        self.question_ids()
            .into_iter()
            .filter(|id| self.is_answered(*id))
            .count()
    }

    fn is_complete(&self) -> bool {
        self.question_ids()
            .into_iter()
            .all(|id| self.is_answered(id))
    }
}

/// Answer update produced by one interaction; `None` clears the question
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerChange {
    pub question_id: QuestionId,
    pub answer: Option<AnswerValue>,
}

impl AnswerChange {
    pub fn set(question_id: QuestionId, answer: AnswerValue) -> Self {
        Self {
            question_id,
            answer: Some(answer),
        }
    }

    pub fn clear(question_id: QuestionId) -> Self {
        Self {
            question_id,
            answer: None,
        }
    }
}

/// Strategy picked from the quiz type
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureBoard {
    MultipleChoice(MultipleChoiceCapture),
    FillInBlank(FillBlankCapture),
    Matching(MatchingBoard),
}

impl CaptureBoard {
    pub fn for_quiz(quiz: &Quiz, blank_delimiter: &str, shuffle_seed: u64) -> Self {
        match quiz.quiz_type {
            QuizType::MultipleChoice => Self::MultipleChoice(MultipleChoiceCapture::new(quiz)),
            QuizType::FillInBlank => {
                Self::FillInBlank(FillBlankCapture::new(quiz, blank_delimiter))
            }
            QuizType::Matching => Self::Matching(MatchingBoard::new(quiz, shuffle_seed)),
        }
    }

    pub fn as_capture(&self) -> &dyn AnswerCapture {
        match self {
            Self::MultipleChoice(c) => c,
            Self::FillInBlank(c) => c,
            Self::Matching(c) => c,
        }
    }

    /// Apply one interaction and hand its answer change to `record`
    ///
    /// The board is put back as it was when `record` refuses the change, so
    /// it never shows an answer the session does not hold.
    pub fn transact<E>(
        &mut self,
        edit: impl FnOnce(&mut Self) -> Option<AnswerChange>,
        record: impl FnOnce(&AnswerChange) -> Result<(), E>,
    ) -> Result<(), E> {
        let before = self.clone();
        let Some(change) = edit(self) else {
            return Ok(());
        };
        if let Err(e) = record(&change) {
            *self = before;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_quiz::testing::quiz_fixture;

    #[test]
    fn test_board_follows_quiz_type() {
        for quiz_type in [
            QuizType::MultipleChoice,
            QuizType::FillInBlank,
            QuizType::Matching,
        ] {
            let quiz = quiz_fixture(quiz_type, 3);
            let board = CaptureBoard::for_quiz(&quiz, "|", 1);
            assert_eq!(board.as_capture().quiz_type(), quiz_type);
            assert_eq!(board.as_capture().question_ids(), vec![1, 2, 3]);
            assert_eq!(board.as_capture().answered_count(), 0);
            assert!(!board.as_capture().is_complete());
        }
    }

    #[test]
    fn test_refused_change_is_rolled_back() {
        let quiz = quiz_fixture(QuizType::FillInBlank, 2);
        let mut board = CaptureBoard::for_quiz(&quiz, "|", 1);

        let edit = |board: &mut CaptureBoard| match board {
            CaptureBoard::FillInBlank(capture) => capture
                .set(1, 0, "x")
                .map(|answer| AnswerChange::set(1, answer)),
            _ => None,
        };
        let refused = board.transact(edit, |_| Err("submitting"));
        assert_eq!(refused, Err("submitting"));
        assert_eq!(board.as_capture().current_answer(1), None);

        let mut recorded = None;
        let accepted = board.transact(edit, |change| {
            recorded = Some(change.clone());
            Ok::<(), &str>(())
        });
        assert_eq!(accepted, Ok(()));
        assert_eq!(recorded, Some(AnswerChange::set(1, AnswerValue::Text("x".into()))));
        assert_eq!(board.as_capture().answered_count(), 1);
    }

    #[test]
    fn test_unpair_refused_keeps_pair() {
        let quiz = quiz_fixture(QuizType::Matching, 2);
        let mut board = CaptureBoard::for_quiz(&quiz, "|", 1);
        if let CaptureBoard::Matching(m) = &mut board {
            m.select_left(1);
            m.select_right("meaning 1");
        }

        let unpair = |board: &mut CaptureBoard| match board {
            CaptureBoard::Matching(m) => match m.select_left(1) {
                MatchEvent::Unpaired { question_id } => Some(AnswerChange::clear(question_id)),
                _ => None,
            },
            _ => None,
        };
        assert!(board.transact(unpair, |_| Err(())).is_err());
        assert_eq!(
            board.as_capture().current_answer(1),
            Some(AnswerValue::Text("meaning 1".into()))
        );
    }
}
