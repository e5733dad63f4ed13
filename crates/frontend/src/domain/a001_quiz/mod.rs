pub mod api;
pub mod capture;
pub mod countdown;
pub mod eligibility;
pub mod runner;
pub mod session;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing {
    use contracts::domain::a001_quiz::{Question, QuestionId, Quiz, QuizType};

    pub fn question(id: QuestionId, text: &str, answer: &str, options: Vec<String>) -> Question {
        Question {
            id,
            question_text: text.to_string(),
            answer: answer.to_string(),
            options,
            is_multi_select: None,
        }
    }

    /// Untimed, always-open quiz with `questions` generated questions (ids from 1)
    pub fn quiz_fixture(quiz_type: QuizType, questions: usize) -> Quiz {
        let questions = (1..=questions as i64)
            .map(|i| match quiz_type {
                QuizType::MultipleChoice => question(
                    i,
                    &format!("Question {}", i),
                    &format!("option {}-a", i),
                    ["a", "b", "c"]
                        .iter()
                        .map(|s| format!("option {}-{}", i, s))
                        .collect(),
                ),
                QuizType::FillInBlank => {
                    question(i, &format!("Sentence {} ___ end", i), &format!("w{}", i), vec![])
                }
                QuizType::Matching => {
                    question(i, &format!("word {}", i), &format!("meaning {}", i), vec![])
                }
            })
            .collect();
        Quiz {
            id: 42,
            title: "HSK 1 review".to_string(),
            quiz_type,
            lesson: None,
            created_by: None,
            timed: false,
            duration_in_minutes: None,
            start_time: None,
            end_time: None,
            attempt_limit: None,
            questions,
        }
    }
}
