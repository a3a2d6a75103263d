// src/handlers/question.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    config::{
        FIXED_LONG_QUIZ_SIZE, FIXED_SHORT_QUIZ_SIZE, RANDOM_EXPLANATION_COUNT, SPEED_QUIZ_SIZE,
        SPEED_TIME_OPTIONS,
    },
    error::AppError,
    handlers::profile::load_user,
    models::{
        genre::{Genre, GenreQuery},
        question::{DailyFact, PublicQuestion, QuestionDetail, SpeedQuizResponse},
        question_stat::QuestionStat,
    },
    services::{catalog::ensure_genre_exists, recommender::recommend_for_genres},
    utils::jwt::AuthUser,
};

/// Lists every genre, alphabetically.
pub async fn list_genres(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list genres: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(genres))
}

async fn random_questions(
    pool: &PgPool,
    genre_id: i64,
    limit: i64,
) -> Result<Vec<PublicQuestion>, AppError> {
    let questions = sqlx::query_as::<_, PublicQuestion>(
        r#"
        SELECT id, genre_id, question_text, option1, option2, option3, option4
        FROM questions
        WHERE genre_id = $1
        ORDER BY RANDOM()
        LIMIT $2
        "#,
    )
    .bind(genre_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to draw questions for genre {}: {:?}", genre_id, e);
        AppError::from(e)
    })?;

    Ok(questions)
}

fn required_genre(query: &GenreQuery) -> Result<i64, AppError> {
    query
        .genre_id
        .ok_or_else(|| AppError::BadRequest("genre_id is required".to_string()))
}

/// Draws a fixed-length batch (25 or 50) from one genre. Answers are withheld.
pub async fn genre_questions(
    State(pool): State<PgPool>,
    Path(size): Path<i64>,
    Query(query): Query<GenreQuery>,
) -> Result<impl IntoResponse, AppError> {
    if size != FIXED_SHORT_QUIZ_SIZE && size != FIXED_LONG_QUIZ_SIZE {
        return Err(AppError::NotFound(format!("No {}-question quiz", size)));
    }
    let genre_id = required_genre(&query)?;
    ensure_genre_exists(&pool, genre_id).await?;

    Ok(Json(random_questions(&pool, genre_id, size).await?))
}

/// Draws a speed quiz batch together with the selectable time limits.
pub async fn speed_questions(
    State(pool): State<PgPool>,
    Query(query): Query<GenreQuery>,
) -> Result<impl IntoResponse, AppError> {
    let genre_id = required_genre(&query)?;
    ensure_genre_exists(&pool, genre_id).await?;

    let questions = random_questions(&pool, genre_id, SPEED_QUIZ_SIZE).await?;

    Ok(Json(SpeedQuizResponse {
        time_options: SPEED_TIME_OPTIONS.to_vec(),
        questions,
    }))
}

/// Full question with answer, explanation and recorded accuracy.
pub async fn question_details(
    State(pool): State<PgPool>,
    _user: AuthUser,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = sqlx::query_as::<_, QuestionDetail>(
        r#"
        SELECT
            q.id, q.genre_id, g.name AS genre_name, q.question_text,
            q.option1, q.option2, q.option3, q.option4,
            q.answer, q.explanation
        FROM questions q
        LEFT JOIN genres g ON g.id = q.genre_id
        WHERE q.id = $1
        "#,
    )
    .bind(question_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let stat = sqlx::query_as::<_, QuestionStat>(
        "SELECT question_id, total_attempts, correct_attempts FROM question_stats WHERE question_id = $1",
    )
    .bind(question_id)
    .fetch_optional(&pool)
    .await?;

    let detail = detail.with_stat(stat);

    Ok(Json(detail))
}

/// A few random explanations from the caller's interest genres.
pub async fn random_explanations(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let genre_ids = load_user(&pool, user.id).await?.interests().genre_ids();

    let explanations: Vec<String> = if genre_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_scalar(
            r#"
            SELECT explanation FROM questions
            WHERE genre_id = ANY($1) AND explanation <> ''
            ORDER BY RANDOM()
            LIMIT $2
            "#,
        )
        .bind(&genre_ids)
        .bind(RANDOM_EXPLANATION_COUNT)
        .fetch_all(&pool)
        .await?
    };

    Ok(Json(json!({ "explanations": explanations })))
}

/// One random explanation per interest genre, labelled with the genre name.
pub async fn daily_facts(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let genre_ids = load_user(&pool, user.id).await?.interests().genre_ids();

    let mut facts = Vec::with_capacity(genre_ids.len());
    for genre_id in genre_ids {
        let fact = sqlx::query_as::<_, DailyFact>(
            r#"
            SELECT g.name AS genre_name, q.explanation
            FROM questions q
            JOIN genres g ON g.id = q.genre_id
            WHERE q.genre_id = $1 AND q.explanation <> ''
            ORDER BY RANDOM()
            LIMIT 1
            "#,
        )
        .bind(genre_id)
        .fetch_optional(&pool)
        .await?;
        facts.extend(fact);
    }

    Ok(Json(json!({ "daily_facts": facts })))
}

/// The questions the community finds hardest in the caller's interest genres.
pub async fn recommended_questions(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let genre_ids = load_user(&pool, user.id).await?.interests().genre_ids();
    let recommendations = recommend_for_genres(&pool, &genre_ids).await?;
    Ok(Json(recommendations))
}
