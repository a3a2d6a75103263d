// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        genre::{CreateGenreRequest, Genre},
        question::{CreateQuestionRequest, ImportQuestionsRequest},
    },
    services::{catalog::ensure_genres_exist, scoring::answers_match},
    utils::html::sanitize_text,
};

/// Creates a genre.
/// Admin only.
pub async fn create_genre(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateGenreRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let name = payload.name.trim();

    let genre = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Genre '{}' already exists", name))
            } else {
                tracing::error!("Failed to create genre: {:?}", e);
                AppError::from(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(genre)))
}

/// The stored answer must be one of the four options.
fn check_answer_is_option(index: usize, q: &CreateQuestionRequest) -> Result<(), AppError> {
    let options = [&q.option1, &q.option2, &q.option3, &q.option4];
    if options.iter().any(|option| answers_match(option, &q.answer)) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Question #{}: answer '{}' is not one of the options",
            index + 1,
            q.answer
        )))
    }
}

/// Bulk-inserts questions in one transaction.
/// Admin only.
pub async fn import_questions(
    State(pool): State<PgPool>,
    Json(payload): Json<ImportQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    for (index, question) in payload.questions.iter().enumerate() {
        check_answer_is_option(index, question)?;
    }

    let mut genre_ids: Vec<i64> = payload.questions.iter().filter_map(|q| q.genre_id).collect();
    genre_ids.sort_unstable();
    genre_ids.dedup();
    ensure_genres_exist(&pool, &genre_ids).await?;

    let mut tx = pool.begin().await?;

    let mut query_builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO questions \
         (genre_id, question_text, option1, option2, option3, option4, answer, explanation) ",
    );
    query_builder.push_values(&payload.questions, |mut row, q| {
        row.push_bind(q.genre_id)
            .push_bind(sanitize_text(&q.question_text))
            .push_bind(q.option1.trim())
            .push_bind(q.option2.trim())
            .push_bind(q.option3.trim())
            .push_bind(q.option4.trim())
            .push_bind(q.answer.trim())
            .push_bind(sanitize_text(&q.explanation));
    });

    let result = query_builder
        .build()
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to import questions: {:?}", e);
            AppError::from(e)
        })?;

    tx.commit().await?;

    tracing::info!("Imported {} questions", result.rows_affected());

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "imported": result.rows_affected() })),
    ))
}

/// Deletes a question and, by cascade, its results and statistics.
/// Admin only.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
