// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const STATUS_WAITING: &str = "waiting";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_ENDED: &str = "ended";

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,

    /// User hosting the quiz, if registered.
    pub host_user_id: Option<i64>,

    pub title: String,

    /// Short code players type in to join.
    pub quiz_code: String,

    pub subject: Option<String>,

    /// 0 = easy, 1 = medium, 2 = hard.
    pub difficulty: Option<i32>,

    pub question_type: Option<String>,
    pub question_source: Option<String>,
    pub num_questions: Option<i32>,

    /// Lifecycle: 'waiting', 'active' or 'ended'. Set by the host, not enforced as a state machine.
    pub status: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    pub host_user_id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 4, max = 16))]
    pub quiz_code: Option<String>,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(range(min = 0, max = 2))]
    pub difficulty: Option<i32>,
    pub question_type: Option<String>,
    pub question_source: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub num_questions: Option<i32>,
    pub status: Option<String>,
}

/// DTO for moving a quiz through its lifecycle.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub fn is_known_status(status: &str) -> bool {
    matches!(status, STATUS_WAITING | STATUS_ACTIVE | STATUS_ENDED)
}

/// Six upper-case hex characters derived from a fresh v4 UUID.
pub fn generate_quiz_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase()
}
