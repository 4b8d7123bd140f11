// src/models/submission.rs
//
// camelCase wire types exchanged with the live room server.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One written answer together with the answer it is graded against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswer {
    pub question_id: Option<i64>,
    pub reference_answer: Option<String>,
    pub answer: Option<String>,
}

/// All answers of one player in one quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSubmission {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub answers: Vec<PlayerAnswer>,
}

/// Graded outcome for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub player_id: String,
    pub player_name: String,
    pub questions_count: usize,
    /// Mean answer score, 0-100.
    pub average_score: f64,
}

/// Parameters for AI question generation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 200, message = "Subject is required."))]
    pub subject: String,
    /// 0 = easy, 1 = medium, anything else = hard.
    #[serde(default)]
    pub difficulty: i32,
    pub question_type: Option<String>,
    #[validate(range(min = 0, max = 50))]
    pub count: u32,
    #[validate(length(max = 4000))]
    pub custom_prompt: Option<String>,
}

/// A multiple-choice question as produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}
