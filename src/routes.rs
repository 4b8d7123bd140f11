// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{ai, auth, quizzes, results, users},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, quizzes, results, ai).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, config, AI clients).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route(
            "/{id}",
            get(users::get_user).merge(
                // Protected: profile edits need a token for the same user
                put(users::update_user)
                    .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
            ),
        )
        .route("/{id}/results", get(users::list_user_results))
        .route("/{id}/activity", get(users::list_user_activity));

    let quiz_routes = Router::new()
        .route("/", post(quizzes::create_quiz))
        .route("/code/{code}", get(quizzes::get_quiz_by_code))
        .route("/{id}", get(quizzes::get_quiz))
        .route("/{id}/status", put(quizzes::update_status))
        .route(
            "/{id}/questions",
            get(quizzes::list_questions).post(quizzes::add_question),
        )
        .route("/{id}/questions/generate", post(quizzes::generate_questions))
        .route(
            "/{id}/participants",
            get(quizzes::list_participants).post(quizzes::add_participant),
        )
        .route("/{id}/answers", post(quizzes::submit_answer))
        .route("/{id}/finalize", post(quizzes::finalize))
        .route("/{id}/results", get(results::list_quiz_results));

    let ai_routes = Router::new()
        .route("/generate", post(ai::generate_quiz))
        .route("/score-written", post(ai::score_written));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/quizzes", quiz_routes)
        .route("/api/results", get(results::list_all_results))
        .nest("/api/ai", ai_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
