// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub quiz_id: i64,

    /// Question type, e.g. 'mcq' or 'written'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: Option<String>,

    /// The prompt shown to players.
    pub question: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Reference answer. For choice questions this is the text of the correct option.
    pub correct_answer: String,

    pub points: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Question {
    /// Whether `selected` indexes the option matching the reference answer.
    pub fn is_correct_option(&self, selected: i32) -> bool {
        usize::try_from(selected)
            .ok()
            .and_then(|i| self.options.get(i))
            .is_some_and(|option| option.trim() == self.correct_answer.trim())
    }
}

/// DTO for adding a question to a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub question_type: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Question text is required."))]
    pub question: String,
    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(max = 2000))]
    pub correct_answer: String,
    #[validate(range(min = 0, max = 1000))]
    pub points: Option<i32>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() > 10 {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
