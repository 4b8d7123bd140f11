// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub quiz_id: i64,
    pub question_id: i64,
    pub participant_id: Option<i64>,
    pub user_id: Option<i64>,

    /// Free-text answer as typed by the player.
    pub answer_text: Option<String>,

    /// Index into the question's options for choice questions.
    pub selected_option: Option<i32>,

    /// Only filled in at submission time for choice questions.
    pub score: Option<i32>,
    pub is_correct: Option<bool>,

    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// An answer joined with its question's reference answer and the player's display name.
/// Input to submission aggregation.
#[derive(Debug, Clone, Default, FromRow)]
pub struct StoredAnswer {
    pub id: i64,
    pub question_id: i64,
    pub participant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub answer_text: Option<String>,
    pub reference_answer: Option<String>,
    pub player_name: Option<String>,
}

/// DTO for submitting one answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub question_id: i64,
    pub participant_id: Option<i64>,
    pub user_id: Option<i64>,
    #[validate(length(max = 5000))]
    pub answer_text: Option<String>,
    #[validate(range(min = 0))]
    pub selected_option: Option<i32>,
}
