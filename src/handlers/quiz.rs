// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::RECENT_HISTORY_LIMIT,
    error::AppError,
    models::{
        question_stat::accuracy_rate,
        quiz::{
            GenreSummary, QuizResultView, QuizSession, QuizType, SubmitQuizRequest,
            SubmitQuizResponse, WrongNoteSubmitRequest,
        },
        ranking::RankingParams,
    },
    services::{
        ranking::leaderboard,
        session::{NewSession, ReplacePolicy, SubmitOutcome, submit_session},
    },
    utils::jwt::AuthUser,
};

fn submitted(outcome: SubmitOutcome, message: &str) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(SubmitQuizResponse {
            message: message.to_string(),
            session_id: outcome.session_id,
            summary: outcome.summary,
        }),
    )
}

/// Grades a quiz batch and records it as a new session.
///
/// Answers referring to unknown questions are skipped; the rest are graded
/// and counted normally.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = submit_session(
        &pool,
        NewSession {
            user_id: user.id,
            genre_id: req.genre_id,
            quiz_type: req.quiz_type,
            started_at: req.started_at,
            answers: &req.quiz_results,
            replace: ReplacePolicy::Keep,
        },
    )
    .await?;

    Ok(submitted(outcome, "Quiz results saved"))
}

/// Grades a wrong-note retake. The new session replaces the origin retake,
/// or every earlier retake of the same type when no origin is given.
/// Regular sessions are left alone and retakes earn no best-of score.
pub async fn submit_wrong_note(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(req): Json<WrongNoteSubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let replace = match req.origin_session_id {
        Some(session_id) => ReplacePolicy::Session(session_id),
        None => ReplacePolicy::PriorOfType,
    };

    let outcome = submit_session(
        &pool,
        NewSession {
            user_id: user.id,
            genre_id: req.genre_id,
            quiz_type: req.quiz_type.unwrap_or(QuizType::WrongNote),
            started_at: req.started_at,
            answers: &req.quiz_results,
            replace,
        },
    )
    .await?;

    Ok(submitted(outcome, "Wrong-note results saved"))
}

/// Top rankings for a score dimension plus the caller's own position.
pub async fn get_ranking(
    State(pool): State<PgPool>,
    user: AuthUser,
    Query(params): Query<RankingParams>,
) -> Result<impl IntoResponse, AppError> {
    let ranking = leaderboard(&pool, params.mode, user.id).await?;
    Ok(Json(ranking))
}

/// The caller's most recent sessions.
pub async fn list_sessions(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let sessions = sqlx::query_as::<_, QuizSession>(
        r#"
        SELECT id, user_id, genre_id, quiz_type, is_retake, created_at, start_time, end_time,
               total_questions, correct_count, wrong_count, total_score
        FROM quiz_sessions
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(user.id)
    .bind(RECENT_HISTORY_LIMIT)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list sessions: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(sessions))
}

const RESULT_VIEW_SELECT: &str = r#"
    SELECT r.id, r.session_id, r.question_id, q.question_text, q.explanation,
           r.user_answer, r.correct_answer, r.is_correct, r.score, r.submission_time
    FROM quiz_results r
    JOIN quiz_sessions s ON s.id = r.session_id
    JOIN questions q ON q.id = r.question_id
"#;

/// The caller's most recent graded answers.
pub async fn list_results(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResultView>(&format!(
        "{RESULT_VIEW_SELECT} WHERE s.user_id = $1 \
         ORDER BY r.submission_time DESC, r.id DESC LIMIT $2"
    ))
    .bind(user.id)
    .bind(RECENT_HISTORY_LIMIT)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Every answer the caller got wrong, newest first.
pub async fn list_wrong_results(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResultView>(&format!(
        "{RESULT_VIEW_SELECT} WHERE s.user_id = $1 AND NOT r.is_correct \
         ORDER BY r.submission_time DESC, r.id DESC"
    ))
    .bind(user.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Correct/total per genre for the caller.
pub async fn genre_summary(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let mut summary = sqlx::query_as::<_, GenreSummary>(
        r#"
        SELECT g.id AS genre_id, g.name AS genre_name,
               COUNT(r.id) FILTER (WHERE r.is_correct) AS correct,
               COUNT(r.id) AS total
        FROM quiz_results r
        JOIN quiz_sessions s ON s.id = r.session_id
        JOIN questions q ON q.id = r.question_id
        JOIN genres g ON g.id = q.genre_id
        WHERE s.user_id = $1
        GROUP BY g.id, g.name
        ORDER BY g.name
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await?;

    for row in &mut summary {
        row.accuracy = accuracy_rate(row.correct, row.total)
            .map(|rate| (rate * 100.0).round() / 100.0)
            .unwrap_or(0.0);
    }

    Ok(Json(summary))
}
