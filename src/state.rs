use crate::{
    config::Config,
    services::{generation::QuestionGenerator, grading::GradingClient},
};
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub grader: GradingClient,
    pub generator: QuestionGenerator,
}

impl AppState {
    /// Builds the outbound AI clients from the configuration they are handed.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let grader = GradingClient::new(config.grading_llm.clone());
        let generator = QuestionGenerator::new(config.generation_llm.clone());

        Self {
            pool,
            config,
            grader,
            generator,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for GradingClient {
    fn from_ref(state: &AppState) -> Self {
        state.grader.clone()
    }
}

impl FromRef<AppState> for QuestionGenerator {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}
