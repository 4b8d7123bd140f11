// src/config.rs

use std::env;
use std::time::Duration;
use dotenvy::dotenv;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Outbound call budget for grading a single answer.
pub const GRADING_TIMEOUT: Duration = Duration::from_secs(15);
/// Outbound call budget for one question-generation request.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one external chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `None` when no credential is configured; callers fall back locally.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// A configuration without credentials. Every call takes the local fallback path.
    pub fn offline() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout: GRADING_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub grading_llm: LlmConfig,
    pub generation_llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        // A blank key is treated the same as a missing one.
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string());

        let grading_llm = LlmConfig {
            api_key: api_key.clone(),
            base_url: base_url.clone(),
            model: env::var("GRADING_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            timeout: GRADING_TIMEOUT,
        };

        let generation_llm = LlmConfig {
            api_key,
            base_url,
            model: env::var("GENERATION_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            timeout: GENERATION_TIMEOUT,
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            grading_llm,
            generation_llm,
        }
    }
}
