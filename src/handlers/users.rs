// src/handlers/users.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, conflict_or_internal},
    handlers::{auth::USER_COLUMNS, results::RESULT_COLUMNS},
    models::{
        result::{QuizResult, UserActivity},
        user::{UpdateUserRequest, User},
    },
    utils::{hash::hash_password, jwt::Claims},
};

async fn fetch_user(pool: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Retrieves a user's public profile.
pub async fn get_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, id).await?;
    Ok(Json(user))
}

/// Updates the caller's own profile. Fields are optional.
pub async fn update_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.user_id()? != id {
        return Err(AppError::Forbidden("You can only edit your own profile".to_string()));
    }

    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Check existence
    fetch_user(&pool, id).await?;

    let password = payload.password.as_deref().map(hash_password).transpose()?;
    let email = payload.email.map(|e| e.trim().to_lowercase());
    let username = payload.username.map(|u| u.trim().to_string());

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            avatar = COALESCE($4, avatar),
            password = COALESCE($5, password),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(payload.avatar)
    .bind(password)
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, "Email or username already in use"))?;

    Ok(Json(json!({
        "success": true,
        "user": user
    })))
}

/// Lists every ranked result recorded for a user.
pub async fn list_user_results(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Dashboard history for a user, most recent first.
pub async fn list_user_activity(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let activity = sqlx::query_as::<_, UserActivity>(
        r#"
        SELECT id, user_id, quiz_id, title, score, accuracy, attempted_at
        FROM user_activity
        WHERE user_id = $1
        ORDER BY attempted_at DESC, id DESC
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(activity))
}
