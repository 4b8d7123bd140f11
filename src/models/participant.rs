// src/models/participant.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'participants' table in the database.
/// Either a registered user or a named guest taking part in one quiz.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: Option<i64>,
    pub guest_name: Option<String>,
    pub is_host: bool,
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for joining a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinQuizRequest {
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 50))]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub is_host: bool,
}
