//! Availability window check for starting a quiz.

use chrono::{DateTime, Utc};
use contracts::domain::a001_quiz::Quiz;

use crate::shared::date_utils::format_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Open,
    NotYetOpen { opens_at: DateTime<Utc> },
    Closed { closed_at: DateTime<Utc> },
}

impl Eligibility {
    pub fn is_open(&self) -> bool {
        matches!(self, Eligibility::Open)
    }

    /// Explanation shown next to a disabled start button
    pub fn message(&self) -> Option<String> {
        match self {
            Eligibility::Open => None,
            Eligibility::NotYetOpen { opens_at } => {
                Some(format!("This quiz opens at {}", format_datetime(opens_at)))
            }
            Eligibility::Closed { closed_at } => {
                Some(format!("This quiz closed at {}", format_datetime(closed_at)))
            }
        }
    }
}

/// Bounds are inclusive; a quiz without a window is always open
pub fn check(quiz: &Quiz, now: DateTime<Utc>) -> Eligibility {
    if let Some(opens_at) = quiz.start_time {
        if now < opens_at {
            return Eligibility::NotYetOpen { opens_at };
        }
    }
    if let Some(closed_at) = quiz.end_time {
        if now > closed_at {
            return Eligibility::Closed { closed_at };
        }
    }
    Eligibility::Open
}
