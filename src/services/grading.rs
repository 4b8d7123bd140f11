// src/services/grading.rs

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::{
    config::LlmConfig,
    services::{llm::LlmClient, scoring::similarity_score},
};

const GRADER_SYSTEM_PROMPT: &str = "You are a concise grader that returns only a numeric score.";

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,3}").expect("static regex"));

/// Outcome of asking the external model for a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalScore {
    Success(u8),
    Unavailable(String),
}

/// Anything that can turn a (reference, candidate) pair into a 0-100 score.
///
/// Implementations must not fail: finalizing a quiz always produces results.
#[async_trait]
pub trait AnswerScorer: Send + Sync {
    async fn score(&self, reference: &str, candidate: &str) -> u8;
}

/// Grades free-text answers with an LLM, falling back to word overlap.
#[derive(Debug, Clone)]
pub struct GradingClient {
    llm: LlmClient,
}

impl GradingClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            llm: LlmClient::new(config),
        }
    }

    /// Asks the model for a score without applying any fallback.
    pub async fn grade_external(&self, reference: &str, candidate: &str) -> ExternalScore {
        if !self.llm.has_credential() {
            return ExternalScore::Unavailable("no API key configured".to_string());
        }

        let prompt = build_grading_prompt(reference, candidate);

        match self.llm.complete(GRADER_SYSTEM_PROMPT, &prompt, 10, 0.0).await {
            Ok(content) => ExternalScore::Success(parse_score(&content)),
            Err(e) => ExternalScore::Unavailable(e.to_string()),
        }
    }
}

#[async_trait]
impl AnswerScorer for GradingClient {
    async fn score(&self, reference: &str, candidate: &str) -> u8 {
        match self.grade_external(reference, candidate).await {
            ExternalScore::Success(score) => score,
            ExternalScore::Unavailable(reason) => {
                if self.llm.has_credential() {
                    tracing::warn!("LLM grading unavailable, using word overlap: {}", reason);
                }
                similarity_score(reference, candidate)
            }
        }
    }
}

/// Word-overlap scorer that never calls out. Same result as `GradingClient` without a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

#[async_trait]
impl AnswerScorer for HeuristicScorer {
    async fn score(&self, reference: &str, candidate: &str) -> u8 {
        similarity_score(reference, candidate)
    }
}

fn build_grading_prompt(reference: &str, candidate: &str) -> String {
    format!(
        "You are an assistant that rates how correct a student's SHORT written answer is compared to a reference answer.\n\
         Return ONLY an integer between 0 and 100 (0 = completely incorrect, 100 = fully correct).\n\
         Reference: \"{}\"\n\
         Student answer: \"{}\"\n\
         Rate the correctness:",
        reference.replace('"', "\\\""),
        candidate.replace('"', "\\\""),
    )
}

/// First run of 1-3 digits in the reply, capped at 100. No digits means 0.
fn parse_score(content: &str) -> u8 {
    FIRST_NUMBER
        .find(content)
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .map(|n| n.min(100) as u8)
        .unwrap_or(0)
}
