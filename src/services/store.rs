// src/services/store.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        answer::StoredAnswer,
        quiz::Quiz,
        result::{NewActivity, NewResult},
    },
    services::finalize::QuizStore,
};

pub const QUIZ_COLUMNS: &str = r#"
    id, host_user_id, title, quiz_code, subject, difficulty, question_type,
    question_source, num_questions, status, created_at, started_at, ended_at
"#;

pub async fn fetch_quiz(pool: &PgPool, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz {}: {:?}", quiz_id, e);
            AppError::from(e)
        })?;

    Ok(quiz)
}

#[async_trait]
impl QuizStore for PgPool {
    async fn find_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
        fetch_quiz(self, quiz_id).await
    }

    async fn answers_for_quiz(&self, quiz_id: i64) -> Result<Vec<StoredAnswer>, AppError> {
        // Player name: guest name, else the participant's account, else the answering account.
        let answers = sqlx::query_as::<_, StoredAnswer>(
            r#"
            SELECT
                a.id,
                a.question_id,
                a.participant_id,
                a.user_id,
                a.answer_text,
                q.correct_answer AS reference_answer,
                COALESCE(p.guest_name, pu.username, au.username) AS player_name
            FROM answers a
            JOIN questions q ON a.question_id = q.id
            LEFT JOIN participants p ON a.participant_id = p.id
            LEFT JOIN users pu ON p.user_id = pu.id
            LEFT JOIN users au ON a.user_id = au.id
            WHERE a.quiz_id = $1
            ORDER BY a.submitted_at, a.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(self)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load answers for quiz {}: {:?}", quiz_id, e);
            AppError::from(e)
        })?;

        Ok(answers)
    }

    async fn insert_result(&self, result: &NewResult) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO results (quiz_id, participant_id, user_id, total_score, accuracy, rank_position)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(result.quiz_id)
        .bind(result.participant_id)
        .bind(result.user_id)
        .bind(result.total_score)
        .bind(result.accuracy)
        .bind(result.rank_position)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert result: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_activity (user_id, quiz_id, title, score, accuracy)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(activity.user_id)
        .bind(activity.quiz_id)
        .bind(&activity.title)
        .bind(activity.score)
        .bind(activity.accuracy)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert user activity: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }
}
