// src/models/question_stat.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'question_stats' table: running attempt counters per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct QuestionStat {
    pub question_id: i64,
    pub total_attempts: i64,
    pub correct_attempts: i64,
}

impl QuestionStat {
    pub fn accuracy(&self) -> Option<f64> {
        accuracy_rate(self.correct_attempts, self.total_attempts)
    }
}

/// correct / total × 100, or `None` when nothing was attempted.
pub fn accuracy_rate(correct: i64, total: i64) -> Option<f64> {
    if total <= 0 {
        return None;
    }
    Some(correct as f64 / total as f64 * 100.0)
}

/// Historical attempts of one question, aggregated over all users.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionAttempts {
    pub question_id: i64,
    pub genre_id: Option<i64>,
    pub question_text: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub total_attempts: i64,
    pub correct_attempts: i64,
}

/// A weak question suggested for review.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub question_id: i64,
    pub genre_id: Option<i64>,
    pub question_text: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub total_attempts: i64,
    pub correct_attempts: i64,
    pub accuracy: f64,
}
