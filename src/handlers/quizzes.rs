// src/handlers/quizzes.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::{AppError, conflict_or_internal},
    models::{
        answer::{Answer, SubmitAnswerRequest},
        participant::{JoinQuizRequest, Participant},
        question::{CreateQuestionRequest, Question},
        quiz::{
            CreateQuizRequest, Quiz, STATUS_ACTIVE, STATUS_ENDED, STATUS_WAITING,
            UpdateStatusRequest, generate_quiz_code, is_known_status,
        },
        submission::{GeneratedQuestion, QuizRequest},
    },
    services::{
        finalize::finalize_quiz,
        generation::QuestionGenerator,
        grading::GradingClient,
        store::{QUIZ_COLUMNS, fetch_quiz},
    },
    utils::html::clean_html,
};

const QUESTION_COLUMNS: &str =
    "id, quiz_id, type, question, options, correct_answer, points, created_at";

const PARTICIPANT_COLUMNS: &str = "id, quiz_id, user_id, guest_name, is_host, joined_at";

const ANSWER_COLUMNS: &str = r#"
    id, quiz_id, question_id, participant_id, user_id, answer_text,
    selected_option, score, is_correct, submitted_at
"#;

/// Loads a quiz or fails with 404.
async fn require_quiz(pool: &PgPool, quiz_id: i64) -> Result<Quiz, AppError> {
    fetch_quiz(pool, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Fails with 404 unless the user exists.
async fn require_user(pool: &PgPool, user_id: i64) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound("User not found".to_string()))
    }
}

/// Fails with 404 unless the participant joined this quiz.
async fn require_participant(pool: &PgPool, participant_id: i64, quiz_id: i64) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM participants WHERE id = $1 AND quiz_id = $2)",
    )
    .bind(participant_id)
    .bind(quiz_id)
    .fetch_one(pool)
    .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound("Participant not found in this quiz".to_string()))
    }
}

/// Creates a quiz. A join code is generated when none is supplied, status defaults to 'waiting'.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let status = payload.status.unwrap_or_else(|| STATUS_WAITING.to_string());
    if !is_known_status(&status) {
        return Err(AppError::BadRequest(format!("Unknown quiz status '{}'", status)));
    }

    if let Some(host_user_id) = payload.host_user_id {
        require_user(&pool, host_user_id).await?;
    }

    let quiz_code = payload
        .quiz_code
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_else(generate_quiz_code);

    let quiz = sqlx::query_as::<_, Quiz>(&format!(
        r#"
        INSERT INTO quizzes
            (host_user_id, title, quiz_code, subject, difficulty, question_type,
             question_source, num_questions, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {QUIZ_COLUMNS}
        "#
    ))
    .bind(payload.host_user_id)
    .bind(clean_html(payload.title.trim()))
    .bind(&quiz_code)
    .bind(payload.subject)
    .bind(payload.difficulty)
    .bind(payload.question_type)
    .bind(payload.question_source)
    .bind(payload.num_questions)
    .bind(status)
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, format!("Quiz code '{}' already in use", quiz_code)))?;

    tracing::info!(quiz_id = quiz.id, code = %quiz.quiz_code, "Created quiz");

    Ok((StatusCode::CREATED, Json(quiz)))
}

pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(require_quiz(&pool, quiz_id).await?))
}

/// Looks a quiz up by its join code (case-insensitive).
pub async fn get_quiz_by_code(
    State(pool): State<PgPool>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE quiz_code = $1"
    ))
    .bind(code.trim().to_uppercase())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

/// Sets the lifecycle status. Entering 'active' or 'ended' stamps the matching timestamp.
pub async fn update_status(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload.status.trim().to_lowercase();
    if !is_known_status(&status) {
        return Err(AppError::BadRequest(format!("Unknown quiz status '{}'", status)));
    }

    let quiz = sqlx::query_as::<_, Quiz>(&format!(
        r#"
        UPDATE quizzes SET
            status = $2,
            started_at = CASE WHEN $2 = '{STATUS_ACTIVE}' THEN NOW() ELSE started_at END,
            ended_at = CASE WHEN $2 = '{STATUS_ENDED}' THEN NOW() ELSE ended_at END
        WHERE id = $1
        RETURNING {QUIZ_COLUMNS}
        "#
    ))
    .bind(quiz_id)
    .bind(&status)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

async fn insert_question(
    pool: &PgPool,
    quiz_id: i64,
    question_type: Option<&str>,
    text: &str,
    options: Vec<String>,
    correct_answer: &str,
    points: i32,
) -> Result<Question, AppError> {
    let question = sqlx::query_as::<_, Question>(&format!(
        r#"
        INSERT INTO questions (quiz_id, type, question, options, correct_answer, points)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {QUESTION_COLUMNS}
        "#
    ))
    .bind(quiz_id)
    .bind(question_type)
    .bind(clean_html(text))
    .bind(SqlJson(options))
    .bind(correct_answer)
    .bind(points)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(question)
}

/// Adds a question to a quiz.
pub async fn add_question(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    require_quiz(&pool, quiz_id).await?;

    let question = insert_question(
        &pool,
        quiz_id,
        payload.question_type.as_deref(),
        &payload.question,
        payload.options,
        &payload.correct_answer,
        payload.points.unwrap_or(1),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Lists a quiz's questions in insertion order.
pub async fn list_questions(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_quiz(&pool, quiz_id).await?;

    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY id"
    ))
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Optional overrides when generating questions into an existing quiz.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateForQuizRequest {
    #[validate(range(min = 1, max = 50))]
    pub count: Option<u32>,
    #[validate(length(max = 4000))]
    pub custom_prompt: Option<String>,
}

/// Generates questions from the quiz's subject and difficulty and stores them.
pub async fn generate_questions(
    State(pool): State<PgPool>,
    State(generator): State<QuestionGenerator>,
    Path(quiz_id): Path<i64>,
    payload: Option<Json<GenerateForQuizRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let quiz = require_quiz(&pool, quiz_id).await?;

    let request = QuizRequest {
        subject: quiz.subject.clone().unwrap_or_else(|| quiz.title.clone()),
        difficulty: quiz.difficulty.unwrap_or(1),
        question_type: quiz.question_type.clone(),
        count: payload
            .count
            .or_else(|| quiz.num_questions.and_then(|n| u32::try_from(n).ok()))
            .unwrap_or(5),
        custom_prompt: payload.custom_prompt,
    };

    let generated: Vec<GeneratedQuestion> = generator.generate(&request).await;

    let mut stored = Vec::with_capacity(generated.len());
    for q in generated {
        let question = insert_question(
            &pool,
            quiz_id,
            quiz.question_type.as_deref().or(Some("mcq")),
            &q.question,
            q.options,
            &q.correct_answer,
            1,
        )
        .await?;
        stored.push(question);
    }

    tracing::info!(quiz_id, count = stored.len(), "Stored generated questions");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Adds a participant, either a registered user or a named guest.
pub async fn add_participant(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<JoinQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if payload.user_id.is_none() && payload.guest_name.is_none() {
        return Err(AppError::BadRequest(
            "Either user_id or guest_name is required".to_string(),
        ));
    }

    require_quiz(&pool, quiz_id).await?;
    if let Some(user_id) = payload.user_id {
        require_user(&pool, user_id).await?;
    }

    let participant = sqlx::query_as::<_, Participant>(&format!(
        r#"
        INSERT INTO participants (quiz_id, user_id, guest_name, is_host)
        VALUES ($1, $2, $3, $4)
        RETURNING {PARTICIPANT_COLUMNS}
        "#
    ))
    .bind(quiz_id)
    .bind(payload.user_id)
    .bind(payload.guest_name.map(|n| n.trim().to_string()))
    .bind(payload.is_host)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to add participant: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn list_participants(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_quiz(&pool, quiz_id).await?;

    let participants = sqlx::query_as::<_, Participant>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE quiz_id = $1 ORDER BY joined_at, id"
    ))
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(participants))
}

/// Records one answer. The question must belong to the quiz.
///
/// Choice answers are marked right or wrong immediately; written answers are
/// graded when the quiz is finalized.
pub async fn submit_answer(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    require_quiz(&pool, quiz_id).await?;

    let question = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1 AND quiz_id = $2"
    ))
    .bind(payload.question_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found in this quiz".to_string()))?;

    if let Some(participant_id) = payload.participant_id {
        require_participant(&pool, participant_id, quiz_id).await?;
    }
    if let Some(user_id) = payload.user_id {
        require_user(&pool, user_id).await?;
    }

    let is_correct = payload.selected_option.map(|i| question.is_correct_option(i));
    let score = is_correct.map(|correct| if correct { question.points } else { 0 });

    // Choice answers without text are stored with the chosen option's text so
    // written-answer grading at finalize sees what the player picked.
    let answer_text = payload.answer_text.or_else(|| {
        payload
            .selected_option
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| question.options.get(i).cloned())
    });

    let answer = sqlx::query_as::<_, Answer>(&format!(
        r#"
        INSERT INTO answers
            (quiz_id, question_id, participant_id, user_id, answer_text, selected_option, score, is_correct)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ANSWER_COLUMNS}
        "#
    ))
    .bind(quiz_id)
    .bind(question.id)
    .bind(payload.participant_id)
    .bind(payload.user_id)
    .bind(answer_text)
    .bind(payload.selected_option)
    .bind(score)
    .bind(is_correct)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store answer: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(answer)))
}

/// Grades all answers of a quiz and persists ranked results.
pub async fn finalize(
    State(pool): State<PgPool>,
    State(grader): State<GradingClient>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = finalize_quiz(&pool, &grader, quiz_id).await?;
    Ok(Json(results))
}
