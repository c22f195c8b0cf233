//! Summarization orchestrator.
//!
//! Builds the prompt from normalized CV text, invokes the configured model
//! backend, and coerces the raw reply into a [`CvSummary`]. All experience
//! date arithmetic (period summing, overlap merging, "Present" resolution)
//! is delegated to the model through the prompt contract; the service does
//! no local date math.

pub mod coerce;
pub mod prompts;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::debug;

use crate::llm_client::{LlmError, TextGenerator};
use crate::models::summary::CvSummary;

/// Upper bound on CV text included in the prompt, to stay inside model
/// context limits.
const PROMPT_TEXT_BUDGET: usize = 8000;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("model backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("model reply contained no parseable JSON: {0}")]
    MalformedResponse(String),

    #[error("model reply is missing a non-empty 'summary' field")]
    MissingSummary,

    #[error("model reply is missing a non-empty 'skills' field")]
    MissingSkills,
}

/// Turns normalized CV text into a structured summary via the model backend.
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn summarize(&self, cv_text: &str) -> Result<CvSummary, SummarizeError> {
        let prompt = build_prompt(cv_text, Utc::now().date_naive());
        debug!(prompt_len = prompt.len(), "requesting CV summary from model");
        let reply = self.generator.generate(&prompt).await?;
        coerce::coerce_reply(&reply)
    }
}

/// Builds the summarization prompt. The assumed current date is injected so
/// "Present" resolves the same way for every backend on a given day.
fn build_prompt(cv_text: &str, today: NaiveDate) -> String {
    let limited = truncate_to_budget(cv_text, PROMPT_TEXT_BUDGET);
    prompts::SUMMARY_PROMPT_TEMPLATE
        .replace("{cv_text}", limited)
        .replace("{current_date}", &today.format("%B %Y").to_string())
}

/// Truncates to at most `budget` bytes without splitting a UTF-8 character.
fn truncate_to_budget(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Debug)]
    struct Unavailable;

    #[async_trait]
    impl TextGenerator for Unavailable {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_prompt_contains_contract_fields() {
        let prompt = build_prompt("some cv text", date());
        assert!(prompt.contains("\"summary\""));
        assert!(prompt.contains("\"skills\""));
        assert!(prompt.contains("\"experience_years\""));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn test_prompt_embeds_cv_text_and_current_date() {
        let prompt = build_prompt("worked at Acme until Present", date());
        assert!(prompt.contains("worked at Acme until Present"));
        assert!(prompt.contains("March 2024"));
        assert!(!prompt.contains("{cv_text}"));
        assert!(!prompt.contains("{current_date}"));
    }

    #[test]
    fn test_prompt_truncates_long_cv_text() {
        let long_text = "x".repeat(PROMPT_TEXT_BUDGET + 500);
        let prompt = build_prompt(&long_text, date());
        assert!(!prompt.contains(&long_text));
        assert!(prompt.contains(&"x".repeat(PROMPT_TEXT_BUDGET)));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(5000); // 2 bytes per char
        let truncated = truncate_to_budget(&text, PROMPT_TEXT_BUDGET + 1);
        assert!(truncated.len() <= PROMPT_TEXT_BUDGET + 1);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn test_summarize_coerces_model_reply() {
        let summarizer = Summarizer::new(Arc::new(Canned(
            r#"{"summary":"Solid backend engineer.","skills":["Rust","SQL"],"experience_years":4.5}"#,
        )));
        let result = summarizer.summarize("cv text").await.unwrap();
        assert_eq!(result.summary, "Solid backend engineer.");
        assert_eq!(result.skills, vec!["Rust", "SQL"]);
        assert!((result.experience_years - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_summarize_propagates_backend_errors() {
        let summarizer = Summarizer::new(Arc::new(Unavailable));
        assert!(matches!(
            summarizer.summarize("cv text").await,
            Err(SummarizeError::Llm(LlmError::EmptyContent))
        ));
    }

    #[tokio::test]
    async fn test_summarize_rejects_prose_only_reply() {
        let summarizer = Summarizer::new(Arc::new(Canned("I cannot read this document.")));
        assert!(matches!(
            summarizer.summarize("cv text").await,
            Err(SummarizeError::MalformedResponse(_))
        ));
    }
}
