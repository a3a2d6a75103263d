// src/services/catalog.rs

use sqlx::PgPool;

use crate::error::AppError;

/// Fails with 404 when the genre does not exist.
pub async fn ensure_genre_exists(pool: &PgPool, genre_id: i64) -> Result<(), AppError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = $1")
        .bind(genre_id)
        .fetch_optional(pool)
        .await?;

    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", genre_id)))
}

/// Fails with 400 naming the first id that has no genre row.
pub async fn ensure_genres_exist(pool: &PgPool, genre_ids: &[i64]) -> Result<(), AppError> {
    if genre_ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = ANY($1)")
        .bind(genre_ids)
        .fetch_all(pool)
        .await?;

    match genre_ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::BadRequest(format!("Unknown genre id {}", missing))),
        None => Ok(()),
    }
}
