// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::question_stat::QuestionStat;

/// DTO for sending a question to a quiz taker (answer and explanation withheld).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicQuestion {
    pub id: i64,
    pub genre_id: Option<i64>,
    pub question_text: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
}

/// Full question with its recorded accuracy, for the review screen.
#[derive(Debug, Serialize, FromRow)]
pub struct QuestionDetail {
    pub id: i64,
    pub genre_id: Option<i64>,
    pub genre_name: Option<String>,
    pub question_text: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub answer: String,
    pub explanation: String,
    #[sqlx(skip)]
    pub total_attempts: i64,
    #[sqlx(skip)]
    pub correct_attempts: i64,
    /// Percentage of correct attempts; `None` until someone answers it.
    #[sqlx(skip)]
    pub accuracy: Option<f64>,
}

impl QuestionDetail {
    pub fn with_stat(mut self, stat: Option<QuestionStat>) -> Self {
        if let Some(stat) = stat {
            self.total_attempts = stat.total_attempts;
            self.correct_attempts = stat.correct_attempts;
            self.accuracy = stat.accuracy();
        }
        self
    }
}

/// The grading view of a question: its options and correct answer.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerKey {
    pub id: i64,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub answer: String,
}

impl AnswerKey {
    pub fn options(&self) -> [&str; 4] {
        [&self.option1, &self.option2, &self.option3, &self.option4]
    }
}

/// Speed quiz batch together with the time limits a client may pick from.
#[derive(Debug, Serialize)]
pub struct SpeedQuizResponse {
    pub time_options: Vec<u32>,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for one imported question.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub genre_id: Option<i64>,
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(length(min = 1, max = 255))]
    pub option1: String,
    #[validate(length(min = 1, max = 255))]
    pub option2: String,
    #[validate(length(min = 1, max = 255))]
    pub option3: String,
    #[validate(length(min = 1, max = 255))]
    pub option4: String,
    #[validate(length(min = 1, max = 255))]
    pub answer: String,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub explanation: String,
}

/// DTO for a bulk import.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportQuestionsRequest {
    #[validate(length(min = 1, max = 1000), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

/// A single explanation shown as a daily fact.
#[derive(Debug, Serialize, FromRow)]
pub struct DailyFact {
    pub genre_name: String,
    pub explanation: String,
}
