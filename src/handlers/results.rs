// src/handlers/results.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{error::AppError, models::result::QuizResult};

pub(crate) const RESULT_COLUMNS: &str =
    "id, quiz_id, participant_id, user_id, total_score, accuracy, time_taken_seconds, rank_position, created_at";

/// Leaderboard for one quiz, ordered by rank.
pub async fn list_quiz_results(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE quiz_id = $1 ORDER BY rank_position, id"
    ))
    .bind(quiz_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch results for quiz {}: {:?}", quiz_id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}

/// Every stored result.
pub async fn list_all_results(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results ORDER BY quiz_id, rank_position, id"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}
