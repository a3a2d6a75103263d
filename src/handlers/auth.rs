// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{
        Interests, LoginRequest, ProfileResponse, RegisterRequest, USER_COLUMNS, User,
        normalize_email,
    },
    services::catalog::ensure_genres_exist,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Maps a UNIQUE violation on `users` to a 409 naming the clashing field.
pub(crate) fn user_conflict(err: sqlx::Error, email: &str, username: &str) -> AppError {
    if !is_unique_violation(&err) {
        tracing::error!("Failed to write user: {:?}", err);
        return AppError::from(err);
    }

    let constraint = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or_default().to_string(),
        _ => String::new(),
    };
    if constraint.contains("email") {
        AppError::Conflict(format!("Email '{}' is already registered", email))
    } else {
        AppError::Conflict(format!("Username '{}' already exists", username))
    }
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it and validates the
/// selected interest genres. Returns 201 Created with the new profile.
pub async fn register(
    State(pool): State<PgPool>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.username = payload.username.trim().to_string();
    payload.validate()?;

    let interests = Interests::from_ids(&payload.interests)?;
    ensure_genres_exist(&pool, &interests.genre_ids()).await?;

    let email = normalize_email(&payload.email);
    let hashed_password = hash_password(&payload.password)?;
    let [interest_1, interest_2, interest_3] = interests.slots();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, username, password, interest_1, interest_2, interest_3)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&email)
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(interest_1)
    .bind(interest_2)
    .bind(interest_3)
    .fetch_one(&pool)
    .await
    .map_err(|e| user_conflict(e, &email, &payload.username))?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful",
            "data": ProfileResponse::from(user),
        })),
    ))
}

/// Authenticates a user by email and returns a JWT token.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(normalize_email(&payload.email))
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "email": user.email,
        "username": user.username,
        "interests": user.interests().genre_ids(),
    })))
}
