// src/services/scoring.rs

//! Answer grading. Pure functions, no I/O.

use std::fmt;

use serde::Deserialize;

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Points per correct answer, keyed by the number of entries in the batch.
const POINTS_TABLE: [(usize, i64); 3] = [(100, 1), (50, 2), (25, 4)];

/// An answer as sent by the client: the option text itself, or the
/// 1-based position of the chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Index(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Option index outside `1..=OPTION_COUNT`.
    OptionOutOfRange(i64),
}

impl fmt::Display for ScoringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringError::OptionOutOfRange(index) => write!(
                f,
                "Option index {} is out of range (expected 1-{})",
                index, OPTION_COUNT
            ),
        }
    }
}

impl std::error::Error for ScoringError {}

/// Outcome of grading one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    /// Resolved answer text as it will be stored. Empty when unanswered.
    pub user_answer: String,
    pub is_correct: bool,
    pub points: i64,
    /// False for a blank answer; blanks never count as attempts.
    pub answered: bool,
}

pub fn points_per_question(batch_size: usize) -> i64 {
    POINTS_TABLE
        .iter()
        .find(|(size, _)| *size == batch_size)
        .map_or(0, |(_, points)| *points)
}

/// Turns a submitted answer into option text.
///
/// Returns `Ok(None)` for a missing or whitespace-only answer.
pub fn resolve_answer<'a>(
    answer: Option<&'a SubmittedAnswer>,
    options: [&'a str; OPTION_COUNT],
) -> Result<Option<&'a str>, ScoringError> {
    let text = match answer {
        None => return Ok(None),
        Some(SubmittedAnswer::Text(text)) => text.as_str(),
        Some(SubmittedAnswer::Index(index)) => {
            let slot = usize::try_from(*index)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .filter(|&i| i < OPTION_COUNT)
                .ok_or(ScoringError::OptionOutOfRange(*index))?;
            options[slot]
        }
    };

    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then_some(trimmed))
}

/// Trimmed, case-insensitive comparison.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    submitted.trim().to_lowercase() == correct.trim().to_lowercase()
}

pub fn grade(
    answer: Option<&SubmittedAnswer>,
    options: [&str; OPTION_COUNT],
    correct_answer: &str,
    points_per_question: i64,
) -> Result<Grade, ScoringError> {
    let grade = match resolve_answer(answer, options)? {
        Some(text) => {
            let is_correct = answers_match(text, correct_answer);
            Grade {
                user_answer: text.to_string(),
                is_correct,
                points: if is_correct { points_per_question } else { 0 },
                answered: true,
            }
        }
        None => Grade {
            user_answer: String::new(),
            is_correct: false,
            points: 0,
            answered: false,
        },
    };
    Ok(grade)
}
