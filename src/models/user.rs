// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Column list matching [`User`], for `SELECT`/`RETURNING` clauses.
pub const USER_COLUMNS: &str = "id, email, username, password, role, \
    interest_1, interest_2, interest_3, \
    score, speed_1min_score, speed_3min_score, solve_score, \
    profile_image, created_at";

/// Lowercases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Login identifier.
    pub email: String,

    /// Unique nickname shown on leaderboards.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub interest_1: Option<i64>,
    pub interest_2: Option<i64>,
    pub interest_3: Option<i64>,

    /// Cumulative score over every submitted session.
    pub score: i64,
    pub speed_1min_score: i64,
    pub speed_3min_score: i64,
    pub solve_score: i64,

    /// Path relative to the media root.
    pub profile_image: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn interests(&self) -> Interests {
        Interests::from_slots([self.interest_1, self.interest_2, self.interest_3])
    }
}

/// Up to three distinct interest genres, stored as three nullable foreign keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interests([Option<i64>; Interests::MAX]);

impl Interests {
    pub const MAX: usize = 3;

    /// Builds the set from genre ids sent by a client.
    /// Rejects more than three ids, duplicates, and non-positive ids.
    pub fn from_ids(ids: &[i64]) -> Result<Self, AppError> {
        if ids.len() > Self::MAX {
            return Err(AppError::BadRequest(format!(
                "At most {} interests may be selected",
                Self::MAX
            )));
        }

        let mut slots = [None; Self::MAX];
        for (slot, &id) in slots.iter_mut().zip(ids) {
            if id <= 0 {
                return Err(AppError::BadRequest(format!("Invalid genre id {}", id)));
            }
            *slot = Some(id);
        }

        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != ids.len() {
            return Err(AppError::BadRequest("Interests must be distinct".to_string()));
        }

        Ok(Self(slots))
    }

    pub fn from_slots(slots: [Option<i64>; Self::MAX]) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> [Option<i64>; Self::MAX] {
        self.0
    }

    pub fn genre_ids(&self) -> Vec<i64> {
        self.0.iter().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

/// Profile of the current user.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: String,
    pub interests: Vec<i64>,
    pub score: i64,
    pub speed_1min_score: i64,
    pub speed_3min_score: i64,
    pub solve_score: i64,
    pub profile_image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        let interests = user.interests().genre_ids();
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            interests,
            score: user.score,
            speed_1min_score: user.speed_1min_score,
            speed_3min_score: user.speed_3min_score,
            solve_score: user.solve_score,
            profile_image: user.profile_image.map(|path| format!("/media/{}", path)),
            created_at: user.created_at,
        }
    }
}

/// DTO for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 3,
        max = 20,
        message = "Username length must be between 3 and 20 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
    #[serde(default)]
    pub interests: Vec<i64>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNicknameRequest {
    #[validate(length(
        min = 3,
        max = 20,
        message = "Username length must be between 3 and 20 characters."
    ))]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInterestsRequest {
    pub interests: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 128))]
    pub current_password: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub new_password: String,
}
