// src/config.rs

use std::{env, fmt, net::SocketAddr};
use dotenvy::dotenv;

/// Question count of the short fixed-length quiz.
pub const FIXED_SHORT_QUIZ_SIZE: i64 = 25;
/// Question count of the long fixed-length quiz.
pub const FIXED_LONG_QUIZ_SIZE: i64 = 50;
/// Upper bound of questions handed out for one speed quiz.
pub const SPEED_QUIZ_SIZE: i64 = 100;
/// Time limits (seconds) a client may choose for a speed quiz.
pub const SPEED_TIME_OPTIONS: [u32; 2] = [60, 180];

pub const RANKING_LIMIT: i64 = 100;
pub const RECOMMENDATION_LIMIT: usize = 10;
pub const RANDOM_EXPLANATION_COUNT: i64 = 3;
pub const RECENT_HISTORY_LIMIT: i64 = 10;

/// Upload limit for profile images.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    /// Directory uploaded files are written to and served from under `/media`.
    pub media_root: String,
    pub admin_email: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = parsed("JWT_EXPIRATION", 86_400)?;

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let media_root = env::var("MEDIA_ROOT")
            .unwrap_or_else(|_| "media".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            media_root,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}
