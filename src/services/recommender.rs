// src/services/recommender.rs

//! Picks the questions users get wrong most often within a set of genres.

use sqlx::PgPool;

use crate::{
    config::RECOMMENDATION_LIMIT,
    error::AppError,
    models::question_stat::{QuestionAttempts, Recommendation, accuracy_rate},
};

/// Orders attempted questions by ascending accuracy and keeps the first `limit`.
///
/// Questions without attempts are dropped. The sort is stable, so ties keep
/// their input order.
pub fn weakest(rows: Vec<QuestionAttempts>, limit: usize) -> Vec<Recommendation> {
    let mut scored: Vec<Recommendation> = rows
        .into_iter()
        .filter_map(|row| {
            let accuracy = accuracy_rate(row.correct_attempts, row.total_attempts)?;
            Some(Recommendation {
                question_id: row.question_id,
                genre_id: row.genre_id,
                question_text: row.question_text,
                option1: row.option1,
                option2: row.option2,
                option3: row.option3,
                option4: row.option4,
                total_attempts: row.total_attempts,
                correct_attempts: row.correct_attempts,
                accuracy,
            })
        })
        .collect();

    scored.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
    scored.truncate(limit);
    scored
}

/// Weakest questions across the given genres, aggregated from every user's
/// non-blank results.
pub async fn recommend_for_genres(
    pool: &PgPool,
    genre_ids: &[i64],
) -> Result<Vec<Recommendation>, AppError> {
    if genre_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, QuestionAttempts>(
        r#"
        SELECT
            q.id AS question_id,
            q.genre_id,
            q.question_text,
            q.option1,
            q.option2,
            q.option3,
            q.option4,
            COUNT(r.id) AS total_attempts,
            COUNT(r.id) FILTER (WHERE r.is_correct) AS correct_attempts
        FROM quiz_results r
        JOIN questions q ON q.id = r.question_id
        WHERE q.genre_id = ANY($1)
          AND BTRIM(r.user_answer) <> ''
        GROUP BY q.id
        ORDER BY q.id
        "#,
    )
    .bind(genre_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to aggregate question attempts: {:?}", e);
        AppError::from(e)
    })?;

    Ok(weakest(rows, RECOMMENDATION_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(question_id: i64, total: i64, correct: i64) -> QuestionAttempts {
        QuestionAttempts {
            question_id,
            genre_id: Some(1),
            question_text: format!("Q{}", question_id),
            option1: "A".to_string(),
            option2: "B".to_string(),
            option3: "C".to_string(),
            option4: "D".to_string(),
            total_attempts: total,
            correct_attempts: correct,
        }
    }

    #[test]
    fn test_weakest_first() {
        let rows = vec![row(1, 4, 3), row(2, 4, 1), row(3, 2, 1)];
        let picked = weakest(rows, 10);
        let ids: Vec<i64> = picked.iter().map(|r| r.question_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(picked[0].accuracy, 25.0);
        assert_eq!(picked[1].accuracy, 50.0);
        assert_eq!(picked[2].accuracy, 75.0);
    }

    #[test]
    fn test_limit_and_non_decreasing_order() {
        let rows: Vec<_> = (1..=25).map(|id| row(id, 25, (id * 7) % 26)).collect();
        let picked = weakest(rows, RECOMMENDATION_LIMIT);
        assert_eq!(picked.len(), RECOMMENDATION_LIMIT);
        assert!(picked.windows(2).all(|w| w[0].accuracy <= w[1].accuracy));
    }

    #[test]
    fn test_unattempted_questions_are_dropped() {
        let picked = weakest(vec![row(1, 0, 0), row(2, 3, 3)], 10);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].question_id, 2);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let picked = weakest(vec![row(5, 2, 1), row(3, 4, 2), row(9, 10, 5)], 10);
        let ids: Vec<i64> = picked.iter().map(|r| r.question_id).collect();
        assert_eq!(ids, vec![5, 3, 9]);
    }

    #[test]
    fn test_empty_input() {
        assert!(weakest(Vec::new(), 10).is_empty());
    }
}
