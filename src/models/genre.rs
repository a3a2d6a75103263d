// src/models/genre.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'genres' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// DTO for creating a genre (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGenreRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Query string carrying the genre a question batch is drawn from.
#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub genre_id: Option<i64>,
}
