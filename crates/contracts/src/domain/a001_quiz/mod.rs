pub mod aggregate;

pub use aggregate::{
    AnswerValue, LessonRef, Question, QuestionId, Quiz, QuizId, QuizResult, QuizType,
    SubmitQuizRequest,
};
