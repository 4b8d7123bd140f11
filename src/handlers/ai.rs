// src/handlers/ai.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::submission::{PlayerSubmission, QuizRequest},
    services::{
        aggregation::score_submissions, generation::QuestionGenerator, grading::GradingClient,
    },
};

/// Generates multiple-choice questions without storing them.
///
/// Always answers with at least one question; AI failures degrade to placeholders.
pub async fn generate_quiz(
    State(generator): State<QuestionGenerator>,
    Json(req): Json<QuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let questions = generator.generate(&req).await;
    Ok(Json(questions))
}

/// Scores written answers collected outside the database (e.g. by the live room server).
/// Returns players sorted by mean score, highest first. Nothing is persisted.
pub async fn score_written(
    State(grader): State<GradingClient>,
    Json(submissions): Json<Vec<PlayerSubmission>>,
) -> Result<impl IntoResponse, AppError> {
    let results = score_submissions(&grader, submissions).await;
    Ok(Json(results))
}
