// tests/llm_tests.rs

use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use quizmaster::{
    config::LlmConfig,
    models::submission::QuizRequest,
    services::{
        generation::QuestionGenerator,
        grading::{AnswerScorer, ExternalScore, GradingClient},
    },
};
use serde_json::{Value, json};

/// Spawns a fake chat-completion endpoint that always replies with `status` and `body`.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_fake_llm(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move |Json(_req): Json<Value>| {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Like `spawn_fake_llm`, but the endpoint takes `delay` before answering.
async fn spawn_slow_llm(delay: Duration, body: Value) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move |Json(_req): Json<Value>| {
            let body = body.clone();
            async move {
                tokio::time::sleep(delay).await;
                Json(body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn chat_reply(content: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

fn llm_config(base_url: String) -> LlmConfig {
    LlmConfig {
        api_key: Some("test-key".to_string()),
        base_url,
        model: "test-model".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn astronomy_request(count: u32) -> QuizRequest {
    QuizRequest {
        subject: "Astronomy".to_string(),
        difficulty: 2,
        question_type: None,
        count,
        custom_prompt: None,
    }
}

#[tokio::test]
async fn grading_uses_model_score() {
    let base = spawn_fake_llm(StatusCode::OK, chat_reply("Score: 87")).await;
    let grader = GradingClient::new(llm_config(base));

    assert_eq!(
        grader.grade_external("the sun", "a star").await,
        ExternalScore::Success(87)
    );
    // The model's verdict wins over word overlap.
    assert_eq!(grader.score("the sun", "a star").await, 87);
}

#[tokio::test]
async fn grading_without_digits_is_zero() {
    let base = spawn_fake_llm(StatusCode::OK, chat_reply("Completely wrong.")).await;
    let grader = GradingClient::new(llm_config(base));

    assert_eq!(grader.score("the sun", "the sun").await, 0);
}

#[tokio::test]
async fn grading_falls_back_on_http_error() {
    let base = spawn_fake_llm(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
    let grader = GradingClient::new(llm_config(base));

    let outcome = grader.grade_external("red green", "green").await;
    assert!(matches!(outcome, ExternalScore::Unavailable(_)));
    assert_eq!(grader.score("red green", "green").await, 50);
}

#[tokio::test]
async fn grading_falls_back_on_malformed_body() {
    let base = spawn_fake_llm(StatusCode::OK, json!({"unexpected": true})).await;
    let grader = GradingClient::new(llm_config(base));

    assert_eq!(grader.score("red green", "red green").await, 100);
}

#[tokio::test]
async fn generation_parses_model_questions() {
    let questions = json!([
        {"question": "Closest star?", "options": ["Sun", "Sirius", "Vega", "Rigel"], "correctAnswer": "Sun"},
        {"question": "Red planet?", "options": ["Venus", "Mars", "Jupiter", "Mercury"], "correctAnswer": "Mars"}
    ]);
    let content = format!("Here you go:\n{}", questions);
    let base = spawn_fake_llm(StatusCode::OK, chat_reply(&content)).await;
    let generator = QuestionGenerator::new(llm_config(base));

    let generated = generator.generate(&astronomy_request(2)).await;
    assert_eq!(generated.len(), 2);
    assert_eq!(generated[1].correct_answer, "Mars");
}

#[tokio::test]
async fn generation_falls_back_on_garbage() {
    let base = spawn_fake_llm(StatusCode::OK, chat_reply("Sorry, I can't do that.")).await;
    let generator = QuestionGenerator::new(llm_config(base));

    let generated = generator.generate(&astronomy_request(3)).await;
    assert_eq!(generated.len(), 3);
    assert_eq!(generated[0].question, "Astronomy sample question 1");
    assert!(generated.iter().all(|q| q.options.len() == 4));
}

#[tokio::test]
async fn generation_falls_back_on_empty_array() {
    let base = spawn_fake_llm(StatusCode::OK, chat_reply("[]")).await;
    let generator = QuestionGenerator::new(llm_config(base));

    assert_eq!(generator.generate(&astronomy_request(4)).await.len(), 4);
}

#[tokio::test]
async fn generation_keeps_only_well_formed_questions() {
    let questions = json!([
        {"question": "Closest star?", "options": ["Sun", "Sirius"], "correctAnswer": "Sun"},
        {"question": "Red planet?", "options": ["Venus", "Mars", "Jupiter", "Mercury"], "correctAnswer": "Mars"}
    ]);
    let base = spawn_fake_llm(StatusCode::OK, chat_reply(&questions.to_string())).await;
    let generator = QuestionGenerator::new(llm_config(base));

    let generated = generator.generate(&astronomy_request(2)).await;
    assert_eq!(generated.len(), 1);
    assert_eq!(generated[0].question, "Red planet?");
}

#[tokio::test]
async fn generation_falls_back_when_no_question_is_usable() {
    let questions = json!([
        {"question": "Closest star?", "options": ["Sun", "Sirius", "Vega", "Rigel"], "correctAnswer": "Polaris"}
    ]);
    let base = spawn_fake_llm(StatusCode::OK, chat_reply(&questions.to_string())).await;
    let generator = QuestionGenerator::new(llm_config(base));

    let generated = generator.generate(&astronomy_request(3)).await;
    assert_eq!(generated.len(), 3);
    assert_eq!(generated[0].question, "Astronomy sample question 1");
    assert!(generated.iter().all(|q| q.options.contains(&q.correct_answer)));
}

#[tokio::test]
async fn grading_times_out_and_falls_back() {
    let base = spawn_slow_llm(Duration::from_secs(5), chat_reply("99")).await;
    let grader = GradingClient::new(LlmConfig {
        timeout: Duration::from_millis(300),
        ..llm_config(base)
    });

    let started = std::time::Instant::now();
    let outcome = grader.grade_external("red green", "green").await;

    assert!(matches!(outcome, ExternalScore::Unavailable(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(grader.score("red green", "green").await, 50);
}
