// src/services/ranking.rs

//! Leaderboards over one score dimension.

use sqlx::PgPool;

use crate::{
    config::RANKING_LIMIT,
    error::AppError,
    models::ranking::{RankingEntry, RankingMode, RankingResponse, ScoreRow},
};

/// Numbers rows 1, 2, 3... in the order given. Equal scores get
/// consecutive ranks.
pub fn assign_ranks(rows: Vec<ScoreRow>) -> Vec<RankingEntry> {
    rows.into_iter()
        .zip(1..)
        .map(|(row, rank)| entry(row, rank))
        .collect()
}

/// The caller's own entry: taken from the top list when present, otherwise
/// ranked behind everyone with a strictly greater score.
pub fn own_entry(top: &[RankingEntry], me: ScoreRow, strictly_greater: i64) -> RankingEntry {
    top.iter()
        .find(|e| e.user_id == me.user_id)
        .cloned()
        .unwrap_or_else(|| entry(me, strictly_greater + 1))
}

fn entry(row: ScoreRow, rank: i64) -> RankingEntry {
    RankingEntry {
        rank,
        user_id: row.user_id,
        username: row.username,
        profile_image: row.profile_image.map(|path| format!("/media/{}", path)),
        score: row.score,
    }
}

pub async fn leaderboard(
    pool: &PgPool,
    mode: RankingMode,
    user_id: i64,
) -> Result<RankingResponse, AppError> {
    let column = mode.column();

    let top_sql = format!(
        "SELECT id AS user_id, username, profile_image, {column} AS score \
         FROM users ORDER BY {column} DESC NULLS LAST, id ASC LIMIT $1"
    );
    let top_rows = sqlx::query_as::<_, ScoreRow>(&top_sql)
        .bind(RANKING_LIMIT)
        .fetch_all(pool)
        .await?;
    let top_rankings = assign_ranks(top_rows);

    let me_sql = format!(
        "SELECT id AS user_id, username, profile_image, {column} AS score FROM users WHERE id = $1"
    );
    let me = sqlx::query_as::<_, ScoreRow>(&me_sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let my_ranking = if top_rankings.iter().any(|e| e.user_id == user_id) {
        own_entry(&top_rankings, me, 0)
    } else {
        let strictly_greater: i64 = match me.score {
            Some(score) => {
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {column} > $1"))
                    .bind(score)
                    .fetch_one(pool)
                    .await?
            }
            // Nulls sort last: everyone with a score is ahead.
            None => {
                sqlx::query_scalar(&format!(
                    "SELECT COUNT(*) FROM users WHERE {column} IS NOT NULL"
                ))
                .fetch_one(pool)
                .await?
            }
        };
        own_entry(&top_rankings, me, strictly_greater)
    };

    Ok(RankingResponse {
        mode,
        top_rankings,
        my_ranking,
    })
}
