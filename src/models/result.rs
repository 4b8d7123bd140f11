// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'results' table in the database.
/// One row per ranked player, written when a quiz is finalized.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub quiz_id: i64,
    pub participant_id: Option<i64>,
    pub user_id: Option<i64>,

    /// Mean answer score rounded to the nearest integer.
    pub total_score: i32,

    /// Unrounded mean answer score, 0-100.
    pub accuracy: f64,

    pub time_taken_seconds: Option<i32>,

    /// 1-based position in the quiz leaderboard.
    pub rank_position: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A result row about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub quiz_id: i64,
    pub participant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub total_score: i32,
    pub accuracy: f64,
    pub rank_position: i32,
}

/// Represents the 'user_activity' table in the database.
/// Denormalized history shown on a user's dashboard.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: Option<i64>,
    pub title: String,
    pub score: i32,
    pub accuracy: f64,
    pub attempted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// An activity row about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: i64,
    pub quiz_id: i64,
    pub title: String,
    pub score: i32,
    pub accuracy: f64,
}
