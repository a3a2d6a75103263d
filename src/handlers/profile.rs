// src/handlers/profile.rs

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::MAX_PROFILE_IMAGE_BYTES,
    error::AppError,
    handlers::auth::user_conflict,
    models::user::{
        ChangePasswordRequest, Interests, ProfileResponse, USER_COLUMNS, UpdateInterestsRequest,
        UpdateNicknameRequest, User,
    },
    services::catalog::ensure_genres_exist,
    state::MediaRoot,
    utils::{
        hash::{hash_password, verify_password},
        jwt::AuthUser,
    },
};

const PROFILE_DIR: &str = "profiles";

pub(crate) async fn load_user(pool: &PgPool, user_id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Get current user's profile and scores.
pub async fn get_profile(
    State(pool): State<PgPool>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let me = load_user(&pool, user.id).await?;
    Ok(Json(ProfileResponse::from(me)))
}

/// Change the nickname. Nicknames are unique.
pub async fn update_nickname(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(mut payload): Json<UpdateNicknameRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.username = payload.username.trim().to_string();
    payload.validate()?;
    let username = payload.username.as_str();

    let result = sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
        .bind(username)
        .bind(user.id)
        .execute(&pool)
        .await
        .map_err(|e| user_conflict(e, "", username))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Nickname updated",
        "username": username,
    })))
}

/// Replace the interest genres. At least one is required.
pub async fn update_interests(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(payload): Json<UpdateInterestsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let interests = Interests::from_ids(&payload.interests)?;
    if interests.is_empty() {
        return Err(AppError::BadRequest(
            "At least one interest must be selected".to_string(),
        ));
    }
    ensure_genres_exist(&pool, &interests.genre_ids()).await?;

    let [interest_1, interest_2, interest_3] = interests.slots();
    let result = sqlx::query(
        "UPDATE users SET interest_1 = $1, interest_2 = $2, interest_3 = $3 WHERE id = $4",
    )
    .bind(interest_1)
    .bind(interest_2)
    .bind(interest_3)
    .bind(user.id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Interests updated",
        "interests": interests.genre_ids(),
    })))
}

/// Change password after checking the current one.
pub async fn change_password(
    State(pool): State<PgPool>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let me = load_user(&pool, user.id).await?;

    if !verify_password(&payload.current_password, &me.password)? {
        return Err(AppError::AuthError("Current password is incorrect".to_string()));
    }
    if verify_password(&payload.new_password, &me.password)? {
        return Err(AppError::BadRequest(
            "New password must differ from the current one".to_string(),
        ));
    }

    let hashed = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(hashed)
        .bind(user.id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "message": "Password changed" })))
}

/// File extension for an accepted image content type.
fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Upload a profile image (multipart field `profile_image`).
///
/// The file lands under `<media root>/profiles/` and replaces any previous image.
pub async fn upload_profile_image(
    State(pool): State<PgPool>,
    State(MediaRoot(media_root)): State<MediaRoot>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("profile_image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = image_extension(&content_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type '{}'", content_type))
        })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((extension, bytes));
        break;
    }

    let (extension, bytes) = upload
        .ok_or_else(|| AppError::BadRequest("profile_image file is required".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded image is empty".to_string()));
    }
    if bytes.len() > MAX_PROFILE_IMAGE_BYTES {
        return Err(AppError::BadRequest("Uploaded image is too large".to_string()));
    }

    let previous = load_user(&pool, user.id).await?.profile_image;

    let relative = format!("{}/{}_{}.{}", PROFILE_DIR, user.id, uuid::Uuid::new_v4(), extension);
    let target_dir = media_root.join(PROFILE_DIR);
    tokio::fs::create_dir_all(&target_dir)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    tokio::fs::write(media_root.join(&relative), &bytes)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    sqlx::query("UPDATE users SET profile_image = $1 WHERE id = $2")
        .bind(&relative)
        .bind(user.id)
        .execute(&pool)
        .await?;

    if let Some(old) = previous {
        if let Err(e) = tokio::fs::remove_file(media_root.join(&old)).await {
            tracing::warn!("Could not remove old profile image {}: {}", old, e);
        }
    }

    Ok(Json(json!({
        "message": "Profile image updated",
        "profile_image": format!("/media/{}", relative),
    })))
}
