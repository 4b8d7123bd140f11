// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, conflict_or_internal},
    models::user::{CreateUserRequest, LoginRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, password, avatar, created_at, updated_at, last_login";

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let username = payload.username.trim();
    let email = payload.email.trim().to_lowercase();

    let taken = sqlx::query_as::<_, (bool, bool)>(
        r#"
        SELECT
            EXISTS (SELECT 1 FROM users WHERE LOWER(email) = $1),
            EXISTS (SELECT 1 FROM users WHERE LOWER(username) = LOWER($2))
        "#,
    )
    .bind(&email)
    .bind(username)
    .fetch_one(&pool)
    .await?;

    match taken {
        (true, _) => return Err(AppError::Conflict("Email already registered".to_string())),
        (_, true) => return Err(AppError::Conflict("Username already taken".to_string())),
        _ => {}
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(&email)
    .bind(hashed_password)
    .fetch_one(&pool)
    .await
    // A concurrent registration can still win the race past the checks above.
    .map_err(|e| conflict_or_internal(e, "Email or username already registered"))?;

    tracing::info!(user_id = user.id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "user": user
        })),
    ))
}

/// Authenticates a user by email and returns a JWT token.
///
/// Unknown e-mail is 404, a wrong password 401. Stamps `last_login` on success.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = $1"
    ))
    .bind(&email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "success": true,
        "user": user,
        "token": token,
        "type": "Bearer"
    })))
}
