// src/models/quiz.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{models::ranking::RankingMode, services::scoring::SubmittedAnswer};

/// Kind of quiz a session was taken as. Stored as its tag string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizType {
    #[serde(rename = "fixed_25")]
    Fixed25,
    #[serde(rename = "fixed_50")]
    Fixed50,
    #[serde(rename = "speed_1min")]
    Speed1Min,
    #[serde(rename = "speed_3min")]
    Speed3Min,
    #[serde(rename = "wrong_note")]
    WrongNote,
    #[default]
    #[serde(rename = "standard")]
    Standard,
}

impl QuizType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::Fixed25 => "fixed_25",
            QuizType::Fixed50 => "fixed_50",
            QuizType::Speed1Min => "speed_1min",
            QuizType::Speed3Min => "speed_3min",
            QuizType::WrongNote => "wrong_note",
            QuizType::Standard => "standard",
        }
    }

    /// Mode-specific score this quiz type competes in, kept as a best-of.
    /// The cumulative total is always additive and is not listed here.
    pub fn best_of_field(self) -> Option<RankingMode> {
        match self {
            QuizType::Fixed25 | QuizType::Fixed50 => Some(RankingMode::Solve),
            QuizType::Speed1Min => Some(RankingMode::Speed1Min),
            QuizType::Speed3Min => Some(RankingMode::Speed3Min),
            QuizType::WrongNote | QuizType::Standard => None,
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed_25" => Ok(QuizType::Fixed25),
            "fixed_50" => Ok(QuizType::Fixed50),
            "speed_1min" => Ok(QuizType::Speed1Min),
            "speed_3min" => Ok(QuizType::Speed3Min),
            "wrong_note" => Ok(QuizType::WrongNote),
            "standard" => Ok(QuizType::Standard),
            other => Err(format!("Unknown quiz type '{}'", other)),
        }
    }
}

/// Represents the 'quiz_sessions' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizSession {
    pub id: i64,
    pub user_id: i64,
    pub genre_id: Option<i64>,
    pub quiz_type: String,
    /// Wrong-note retake; only these are replaced by later retakes.
    pub is_retake: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub total_questions: i64,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub total_score: i64,
}

/// A stored result joined with its question, for history screens.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizResultView {
    pub id: i64,
    pub session_id: i64,
    pub question_id: i64,
    pub question_text: String,
    pub explanation: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub score: i64,
    pub submission_time: chrono::DateTime<chrono::Utc>,
}

/// Per-genre accuracy of the current user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenreSummary {
    pub genre_id: i64,
    pub genre_name: String,
    pub correct: i64,
    pub total: i64,
    #[sqlx(skip)]
    pub accuracy: f64,
}

/// One answered question in a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    /// Option text or 1-based option index. Missing or blank means unanswered.
    #[serde(default)]
    pub user_answer: Option<SubmittedAnswer>,
}

/// DTO for `POST /api/quiz/submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_results: Vec<AnswerSubmission>,
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub quiz_type: QuizType,
    /// When the client started the quiz; defaults to the submission time.
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for `POST /api/quiz/wrong-note-submit`.
#[derive(Debug, Deserialize)]
pub struct WrongNoteSubmitRequest {
    pub quiz_results: Vec<AnswerSubmission>,
    pub genre_id: Option<i64>,
    pub quiz_type: Option<QuizType>,
    /// Prior retake to replace. Without it every earlier retake of the
    /// same type is replaced. Regular sessions are never replaced.
    pub origin_session_id: Option<i64>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub total: i64,
    pub correct: i64,
    pub wrong: i64,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub message: String,
    pub session_id: i64,
    pub summary: SessionSummary,
}
