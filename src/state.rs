// src/state.rs

use std::path::PathBuf;

use crate::config::Config;
use axum::extract::FromRef;
use sqlx::PgPool;

/// Shared handler state: the connection pool plus immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self { pool, config }
    }
}

/// Root directory of uploaded media (profile images).
#[derive(Debug, Clone)]
pub struct MediaRoot(pub PathBuf);

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for MediaRoot {
    fn from_ref(state: &AppState) -> Self {
        MediaRoot(PathBuf::from(&state.config.media_root))
    }
}
