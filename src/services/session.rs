// src/services/session.rs

//! Grades a submitted batch and records it as one quiz session.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        question::AnswerKey,
        quiz::{AnswerSubmission, QuizType, SessionSummary},
        ranking::RankingMode,
    },
    services::scoring::{Grade, ScoringError, grade, points_per_question},
};

/// Rows per multi-row INSERT; keeps bind parameters well under the
/// Postgres limit.
const INSERT_CHUNK: usize = 1000;

/// One graded entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    /// Snapshot of the question's answer at grading time.
    pub correct_answer: String,
    pub grade: Grade,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradedBatch {
    pub answers: Vec<GradedAnswer>,
    /// Entries whose question id did not resolve.
    pub skipped: usize,
}

impl GradedBatch {
    pub fn summary(&self) -> SessionSummary {
        let correct = self.answers.iter().filter(|a| a.grade.is_correct).count() as i64;
        let total = self.answers.len() as i64;
        SessionSummary {
            total,
            correct,
            wrong: total - correct,
            score: self.answers.iter().map(|a| a.grade.points).sum(),
        }
    }

    /// Attempt counter increments per question, `(total, correct)`.
    /// Blank answers are not attempts.
    pub fn stat_deltas(&self) -> BTreeMap<i64, (i64, i64)> {
        let mut deltas = BTreeMap::new();
        for answer in self.answers.iter().filter(|a| a.grade.answered) {
            let entry = deltas.entry(answer.question_id).or_insert((0, 0));
            entry.0 += 1;
            if answer.grade.is_correct {
                entry.1 += 1;
            }
        }
        deltas
    }
}

/// Grades every submission against the loaded answer keys, in submission order.
///
/// The point value is chosen from the size of the whole batch, including
/// entries that end up skipped.
pub fn grade_batch(
    submissions: &[AnswerSubmission],
    keys: &HashMap<i64, AnswerKey>,
) -> Result<GradedBatch, ScoringError> {
    let points = points_per_question(submissions.len());
    let mut batch = GradedBatch::default();

    for submission in submissions {
        let Some(key) = keys.get(&submission.question_id) else {
            tracing::debug!("Skipping unknown question {}", submission.question_id);
            batch.skipped += 1;
            continue;
        };

        let grade = grade(
            submission.user_answer.as_ref(),
            key.options(),
            &key.answer,
            points,
        )?;

        batch.answers.push(GradedAnswer {
            question_id: key.id,
            correct_answer: key.answer.clone(),
            grade,
        });
    }

    Ok(batch)
}

/// Which earlier sessions a new submission replaces.
///
/// Anything other than `Keep` marks the new session as a wrong-note retake.
/// Only retakes are ever replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacePolicy {
    Keep,
    /// Every earlier retake of the same quiz type by this user.
    PriorOfType,
    /// One specific earlier retake, if the user owns it.
    Session(i64),
}

impl ReplacePolicy {
    pub fn is_retake(self) -> bool {
        self != ReplacePolicy::Keep
    }
}

/// Mode-specific score a session competes in. Retakes only count
/// toward the cumulative total.
pub fn best_of_field(quiz_type: QuizType, replace: ReplacePolicy) -> Option<RankingMode> {
    if replace.is_retake() {
        None
    } else {
        quiz_type.best_of_field()
    }
}

#[derive(Debug, Clone)]
pub struct NewSession<'a> {
    pub user_id: i64,
    pub genre_id: Option<i64>,
    pub quiz_type: QuizType,
    pub started_at: Option<DateTime<Utc>>,
    pub answers: &'a [AnswerSubmission],
    pub replace: ReplacePolicy,
}

#[derive(Debug, Clone, Copy)]
pub struct SubmitOutcome {
    pub session_id: i64,
    pub summary: SessionSummary,
}

/// Creates, grades, and closes a session in one transaction, then credits
/// the user's scores.
pub async fn submit_session(pool: &PgPool, new: NewSession<'_>) -> Result<SubmitOutcome, AppError> {
    if new.answers.is_empty() {
        return Err(AppError::BadRequest("No answers submitted".to_string()));
    }

    let mut tx = pool.begin().await?;

    let user_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(new.user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if user_exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if let Some(genre_id) = new.genre_id {
        let genre: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = $1")
            .bind(genre_id)
            .fetch_optional(&mut *tx)
            .await?;
        if genre.is_none() {
            return Err(AppError::NotFound(format!("Genre {} not found", genre_id)));
        }
    }

    replace_prior_sessions(&mut tx, &new).await?;

    let now = Utc::now();
    let session_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quiz_sessions (user_id, genre_id, quiz_type, is_retake, created_at, start_time)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(new.user_id)
    .bind(new.genre_id)
    .bind(new.quiz_type.as_str())
    .bind(new.replace.is_retake())
    .bind(now)
    .bind(new.started_at.unwrap_or(now))
    .fetch_one(&mut *tx)
    .await?;

    let keys = load_answer_keys(&mut tx, new.answers).await?;
    let batch = grade_batch(new.answers, &keys)?;

    if batch.skipped > 0 {
        tracing::info!(
            "Session {}: skipped {} answers with unknown question ids",
            session_id,
            batch.skipped
        );
    }

    insert_results(&mut tx, session_id, &batch, now).await?;
    record_attempts(&mut tx, &batch).await?;

    let summary = batch.summary();

    sqlx::query(
        r#"
        UPDATE quiz_sessions
        SET end_time = $1,
            total_questions = $2,
            correct_count = $3,
            wrong_count = $4,
            total_score = $5
        WHERE id = $6
        "#,
    )
    .bind(Utc::now())
    .bind(summary.total)
    .bind(summary.correct)
    .bind(summary.wrong)
    .bind(summary.score)
    .bind(session_id)
    .execute(&mut *tx)
    .await?;

    credit_scores(
        &mut tx,
        new.user_id,
        best_of_field(new.quiz_type, new.replace),
        summary.score,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        "User {} finished {} session {}: {}/{} correct, {} points",
        new.user_id,
        new.quiz_type,
        session_id,
        summary.correct,
        summary.total,
        summary.score
    );

    Ok(SubmitOutcome {
        session_id,
        summary,
    })
}

async fn replace_prior_sessions(
    conn: &mut PgConnection,
    new: &NewSession<'_>,
) -> Result<(), AppError> {
    let result = match new.replace {
        ReplacePolicy::Keep => return Ok(()),
        ReplacePolicy::PriorOfType => {
            sqlx::query(
                "DELETE FROM quiz_sessions WHERE user_id = $1 AND quiz_type = $2 AND is_retake",
            )
            .bind(new.user_id)
            .bind(new.quiz_type.as_str())
            .execute(&mut *conn)
            .await?
        }
        ReplacePolicy::Session(session_id) => {
            sqlx::query("DELETE FROM quiz_sessions WHERE id = $1 AND user_id = $2 AND is_retake")
                .bind(session_id)
                .bind(new.user_id)
                .execute(&mut *conn)
                .await?
        }
    };

    tracing::debug!(
        "Replaced {} prior {} sessions of user {}",
        result.rows_affected(),
        new.quiz_type,
        new.user_id
    );
    Ok(())
}

async fn load_answer_keys(
    conn: &mut PgConnection,
    submissions: &[AnswerSubmission],
) -> Result<HashMap<i64, AnswerKey>, AppError> {
    let mut ids: Vec<i64> = submissions.iter().map(|s| s.question_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut query_builder = QueryBuilder::<Postgres>::new(
        "SELECT id, option1, option2, option3, option4, answer FROM questions WHERE id IN (",
    );
    let mut separated = query_builder.separated(",");
    for id in &ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let keys: Vec<AnswerKey> = query_builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await?;

    Ok(keys.into_iter().map(|k| (k.id, k)).collect())
}

async fn insert_results(
    conn: &mut PgConnection,
    session_id: i64,
    batch: &GradedBatch,
    submitted_at: DateTime<Utc>,
) -> Result<(), AppError> {
    for chunk in batch.answers.chunks(INSERT_CHUNK) {
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO quiz_results \
             (session_id, question_id, user_answer, correct_answer, is_correct, score, submission_time) ",
        );
        query_builder.push_values(chunk, |mut row, answer| {
            row.push_bind(session_id)
                .push_bind(answer.question_id)
                .push_bind(&answer.grade.user_answer)
                .push_bind(&answer.correct_answer)
                .push_bind(answer.grade.is_correct)
                .push_bind(answer.grade.points)
                .push_bind(submitted_at);
        });
        query_builder.build().execute(&mut *conn).await?;
    }
    Ok(())
}

async fn record_attempts(conn: &mut PgConnection, batch: &GradedBatch) -> Result<(), AppError> {
    let deltas: Vec<(i64, (i64, i64))> = batch.stat_deltas().into_iter().collect();
    for chunk in deltas.chunks(INSERT_CHUNK) {
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO question_stats (question_id, total_attempts, correct_attempts) ",
        );
        query_builder.push_values(chunk, |mut row, (question_id, (total, correct))| {
            row.push_bind(*question_id)
                .push_bind(*total)
                .push_bind(*correct);
        });
        query_builder.push(
            " ON CONFLICT (question_id) DO UPDATE SET \
             total_attempts = question_stats.total_attempts + EXCLUDED.total_attempts, \
             correct_attempts = question_stats.correct_attempts + EXCLUDED.correct_attempts",
        );
        query_builder.build().execute(&mut *conn).await?;
    }
    Ok(())
}

fn credit_sql(best_of: Option<RankingMode>) -> String {
    match best_of {
        Some(field) => format!(
            "UPDATE users SET score = score + $1, {column} = GREATEST({column}, $1) WHERE id = $2",
            column = field.column()
        ),
        None => "UPDATE users SET score = score + $1 WHERE id = $2".to_string(),
    }
}

/// Adds the session score to the cumulative total and raises the best-of
/// field when beaten.
///
/// Both happen in one UPDATE. The row lock it takes is held until commit, so
/// concurrent submissions by the same user are applied one after another.
async fn credit_scores(
    conn: &mut PgConnection,
    user_id: i64,
    best_of: Option<RankingMode>,
    score: i64,
) -> Result<(), AppError> {
    sqlx::query(&credit_sql(best_of))
        .bind(score)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
