// src/services/generation.rs

use crate::{
    config::LlmConfig,
    models::submission::{GeneratedQuestion, QuizRequest},
    services::llm::LlmClient,
};

const GENERATOR_SYSTEM_PROMPT: &str = "You are a helpful assistant that outputs strict JSON only.";

const JSON_FORMAT_EXAMPLE: &str =
    "[ { \"question\": \"...\", \"options\": [\"A\",\"B\",\"C\",\"D\"], \"correctAnswer\": \"A\" }, ... ]";

/// Produces multiple-choice questions with an LLM, or placeholders when it can't.
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    llm: LlmClient,
}

impl QuestionGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            llm: LlmClient::new(config),
        }
    }

    /// Never returns an empty list: any failure yields `max(1, count)` placeholder questions.
    pub async fn generate(&self, req: &QuizRequest) -> Vec<GeneratedQuestion> {
        if !self.llm.has_credential() {
            return placeholder_questions(req, true);
        }

        let prompt = build_prompt(req);

        let content = match self.llm.complete(GENERATOR_SYSTEM_PROMPT, &prompt, 1500, 0.2).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Question generation failed, using placeholders: {}", e);
                return placeholder_questions(req, false);
            }
        };

        match parse_questions(&content) {
            Some(questions) if !questions.is_empty() => {
                tracing::info!(count = questions.len(), model = %self.llm.model(), "Generated questions");
                questions
            }
            _ => {
                tracing::warn!("Unparseable question list from model, using placeholders");
                placeholder_questions(req, false)
            }
        }
    }
}

pub fn difficulty_label(difficulty: i32) -> &'static str {
    match difficulty {
        0 => "Easy",
        1 => "Medium",
        _ => "Hard",
    }
}

fn difficulty_instruction(difficulty: i32) -> &'static str {
    match difficulty {
        0 => "Easy: create definition-based questions (straightforward facts).",
        1 => "Medium: create conceptual questions that test understanding.",
        _ => "Hard: create scenario-based questions requiring analysis.",
    }
}

/// Builds the user message sent to the model.
///
/// A non-blank custom prompt is used as-is, followed by the strict JSON instructions.
pub fn build_prompt(req: &QuizRequest) -> String {
    if let Some(custom) = req.custom_prompt.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        return format!(
            "{custom}\n\n\
             IMPORTANT: Return ONLY a JSON array of question objects and nothing else (no prose, no numbering, no backticks).\n\
             Each object must have keys: \"question\" (string), \"options\" (array of 4 strings), and \"correctAnswer\" (one of the option strings).\n\
             Example format:\n\
             {JSON_FORMAT_EXAMPLE}\n"
        );
    }

    format!(
        "You are an exam question generator.\n\
         Generate exactly {count} multiple-choice questions about '{subject}'.\n\
         {level}\n\
         Each question must be an object with keys: \"question\" (string), \"options\" (array of 4 strings), and \"correctAnswer\" (one of the option strings).\n\
         Return ONLY a minified JSON array of these objects and nothing else (no prose, no numbering, no backticks).\n\
         Example format:\n\
         {JSON_FORMAT_EXAMPLE}\n\
         Ensure options are plausible distractors and that correctAnswer exactly matches one option.\n\
         Do not include metadata keys.\n",
        count = req.count,
        subject = req.subject,
        level = difficulty_instruction(req.difficulty),
    )
}

/// Parses the model reply, tolerating prose around the JSON array.
fn parse_questions(content: &str) -> Option<Vec<GeneratedQuestion>> {
    let trimmed = content.trim();
    let json = match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    };

    let questions: Vec<GeneratedQuestion> = match serde_json::from_str(json) {
        Ok(questions) => questions,
        Err(e) => {
            tracing::debug!("Failed to parse generated questions: {}", e);
            return None;
        }
    };

    let parsed = questions.len();
    let valid: Vec<GeneratedQuestion> = questions.into_iter().filter(is_well_formed).collect();
    if valid.len() < parsed {
        tracing::warn!(dropped = parsed - valid.len(), "Dropped malformed generated questions");
    }

    Some(valid)
}

/// Non-blank text, exactly four options, and a correct answer that is one of them.
fn is_well_formed(question: &GeneratedQuestion) -> bool {
    !question.question.trim().is_empty()
        && question.options.len() == 4
        && question.options.contains(&question.correct_answer)
}

/// Deterministic stand-in questions. Option A is always correct.
fn placeholder_questions(req: &QuizRequest, label_difficulty: bool) -> Vec<GeneratedQuestion> {
    (1..=req.count.max(1))
        .map(|i| {
            let question = if label_difficulty {
                format!(
                    "{} sample question {} ({})",
                    req.subject,
                    i,
                    difficulty_label(req.difficulty)
                )
            } else {
                format!("{} sample question {}", req.subject, i)
            };
            let options: Vec<String> = ["A", "B", "C", "D"]
                .iter()
                .map(|letter| format!("Option {} for Q{}", letter, i))
                .collect();

            GeneratedQuestion {
                question,
                correct_answer: options[0].clone(),
                options,
            }
        })
        .collect()
}
