// src/models/ranking.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Score dimension a leaderboard can be built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingMode {
    #[serde(rename = "speed_1min")]
    Speed1Min,
    #[serde(rename = "speed_3min")]
    Speed3Min,
    #[serde(rename = "solve")]
    Solve,
    #[default]
    #[serde(rename = "total")]
    Total,
}

impl RankingMode {
    /// Column in `users` holding this dimension. Only these fixed names are
    /// ever interpolated into SQL.
    pub fn column(self) -> &'static str {
        match self {
            RankingMode::Speed1Min => "speed_1min_score",
            RankingMode::Speed3Min => "speed_3min_score",
            RankingMode::Solve => "solve_score",
            RankingMode::Total => "score",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    #[serde(default)]
    pub mode: RankingMode,
}

/// A user row projected onto one score dimension.
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub user_id: i64,
    pub username: String,
    pub profile_image: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub profile_image: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub mode: RankingMode,
    pub top_rankings: Vec<RankingEntry>,
    pub my_ranking: RankingEntry,
}
