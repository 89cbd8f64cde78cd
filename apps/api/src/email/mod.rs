//! Cold email drafting and revision.
//! All LLM calls go through `llm_client::TextGenerator`, never the HTTP API directly.

pub mod handlers;
pub mod parser;
pub mod prompts;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{LlmError, TextGenerator};
use crate::profile::ProfileRecord;
use parser::parse_model_json;
use prompts::{compose_message, improve_message, COMPOSE_SYSTEM, IMPROVE_SYSTEM};

/// Recipient placeholder when the caller does not name one.
pub const DEFAULT_RECIPIENT: &str = "the recipient";
const SALUTATION_PREFIX: &str = "Dear ";
const ANONYMOUS_SALUTATION: &str = "Sir or Madam";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("{0}")]
    Config(String),

    #[error("Email generation failed: {0}")]
    Generation(LlmError),

    #[error("Could not parse model response: {0}")]
    Parse(String),
}

impl From<LlmError> for ComposeError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => ComposeError::Config(e.to_string()),
            other => ComposeError::Generation(other),
        }
    }
}

/// A drafted email body plus the model's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDraft {
    pub body: String,
    pub rationale: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ComposeOutput {
    email_output: String,
    analysis_rationale: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ImproveOutput {
    email_output: String,
    improvement_rationale: Vec<String>,
}

/// Drafts a first email for the profiled person, steered by the campaign prompt.
pub async fn compose_email(
    profile: &ProfileRecord,
    prompt: &str,
    llm: &dyn TextGenerator,
) -> Result<EmailDraft, ComposeError> {
    let user_message = compose_message(
        &profile.full_name,
        prompt,
        &profile.headline,
        &profile.about,
    );

    info!("Composing email for {}", profile.full_name);
    let text = llm.generate(&user_message, COMPOSE_SYSTEM).await?;
    let output: ComposeOutput = parse_model_json(&text)?;

    Ok(EmailDraft {
        body: ensure_salutation(output.email_output, profile.first_name()),
        rationale: output.analysis_rationale,
    })
}

/// Revises an existing email according to the caller's instructions.
pub async fn improve_email(
    email: &str,
    prompt: &str,
    recipient_name: &str,
    llm: &dyn TextGenerator,
) -> Result<EmailDraft, ComposeError> {
    let user_message = improve_message(email, recipient_name, prompt);

    info!("Improving email for {recipient_name}");
    let text = llm.generate(&user_message, IMPROVE_SYSTEM).await?;
    let output: ImproveOutput = parse_model_json(&text)?;

    let first_name = if recipient_name == DEFAULT_RECIPIENT {
        None
    } else {
        recipient_name.split_whitespace().next()
    };

    Ok(EmailDraft {
        body: ensure_salutation(output.email_output, first_name),
        rationale: output.improvement_rationale,
    })
}

/// Every body opens with "Dear <First Name>,". Prepends one when the model skipped it.
fn ensure_salutation(body: String, first_name: Option<&str>) -> String {
    if body.trim_start().starts_with(SALUTATION_PREFIX) {
        return body;
    }
    warn!("Model output lacks a salutation, prepending one");
    let name = first_name.unwrap_or(ANONYMOUS_SALUTATION);
    format!("{SALUTATION_PREFIX}{name},\n\n{}", body.trim_start())
}


#[cfg(test)]
mod tests {
    use super::testing::FakeGenerator;
    use super::*;

    fn profile() -> ProfileRecord {
        ProfileRecord {
            full_name: "Ada Lovelace".to_string(),
            headline: "Analyst at Engines Ltd".to_string(),
            about: "I write programs.".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_compose_returns_email_output_verbatim() {
        let body = "Dear Ada,\n\nYour engine work stood out. Open to a quick call?";
        let llm = FakeGenerator::replying(&format!(
            "```json\n{}\n```",
            serde_json::json!({"email_output": body, "analysis_rationale": ["engines", "math"]})
        ));
        let draft = compose_email(&profile(), "Sell a compiler", &llm).await.unwrap();
        assert_eq!(draft.body, body);
        assert_eq!(draft.rationale, vec!["engines", "math"]);
    }

    #[tokio::test]
    async fn test_compose_interpolates_profile_and_prompt() {
        let llm = FakeGenerator::replying(
            r#"{"email_output": "Dear Ada, hi.", "analysis_rationale": []}"#,
        );
        compose_email(&profile(), "Sell a compiler", &llm).await.unwrap();
        let calls = llm.calls.lock().unwrap();
        let (prompt, system) = &calls[0];
        assert_eq!(
            prompt,
            "Their name is Ada Lovelace.\n\n***Important prompt***:[ Sell a compiler ]. Analyst at Engines Ltd. I write programs.."
        );
        assert_eq!(system, COMPOSE_SYSTEM);
    }

    #[tokio::test]
    async fn test_compose_keeps_braces_in_caller_text() {
        let llm = FakeGenerator::replying(
            r#"{"email_output": "Dear Ada, hi.", "analysis_rationale": []}"#,
        );
        compose_email(&profile(), "mention {about} and {headline} literally", &llm)
            .await
            .unwrap();
        let calls = llm.calls.lock().unwrap();
        assert!(calls[0]
            .0
            .contains("[ mention {about} and {headline} literally ]"));
    }

    #[tokio::test]
    async fn test_compose_prepends_missing_salutation() {
        let llm = FakeGenerator::replying(
            r#"{"email_output": "Your engine work stood out.", "analysis_rationale": []}"#,
        );
        let draft = compose_email(&profile(), "p", &llm).await.unwrap();
        assert_eq!(draft.body, "Dear Ada,\n\nYour engine work stood out.");
    }

    #[tokio::test]
    async fn test_compose_missing_rationale_is_parse_error() {
        let llm = FakeGenerator::replying(r#"{"email_output": "Dear Ada,"}"#);
        let err = compose_email(&profile(), "p", &llm).await.unwrap_err();
        assert!(matches!(err, ComposeError::Parse(_)));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_is_not_retried() {
        let llm = FakeGenerator::failing(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        });
        let err = compose_email(&profile(), "p", &llm).await.unwrap_err();
        assert!(matches!(err, ComposeError::Generation(_)));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_maps_to_config_error() {
        let llm = FakeGenerator::failing(LlmError::MissingApiKey);
        let err = improve_email("Dear Ada,", "shorter", "Ada", &llm)
            .await
            .unwrap_err();
        assert!(matches!(err, ComposeError::Config(_)));
    }

    #[tokio::test]
    async fn test_improve_reads_improvement_rationale() {
        let llm = FakeGenerator::replying(
            "```json\n{\"email_output\": \"Dear Ada,\\nShorter now.\", \"improvement_rationale\": [\"cut fluff\"]}\n```",
        );
        let draft = improve_email("Dear Ada, long text", "make it shorter", "Ada Lovelace", &llm)
            .await
            .unwrap();
        assert_eq!(draft.body, "Dear Ada,\nShorter now.");
        assert_eq!(draft.rationale, vec!["cut fluff"]);

        let calls = llm.calls.lock().unwrap();
        assert_eq!(
            calls[0].0,
            "Here is the original email:\n\nDear Ada, long text\n\nThe recipient's name is Ada Lovelace.\n\nImprovement instructions: make it shorter"
        );
        assert_eq!(calls[0].1, IMPROVE_SYSTEM);
    }

    #[tokio::test]
    async fn test_improve_keeps_placeholder_like_text_in_email() {
        let llm = FakeGenerator::replying(
            r#"{"email_output": "Dear Ada, ok.", "improvement_rationale": []}"#,
        );
        improve_email(
            "Dear Ada, reply with {prompt} in the subject.",
            "make it shorter",
            "{recipient_name}",
            &llm,
        )
        .await
        .unwrap();
        let calls = llm.calls.lock().unwrap();
        assert_eq!(
            calls[0].0,
            "Here is the original email:\n\nDear Ada, reply with {prompt} in the subject.\n\nThe recipient's name is {recipient_name}.\n\nImprovement instructions: make it shorter"
        );
    }

    #[tokio::test]
    async fn test_improve_rejects_compose_shaped_output() {
        let llm = FakeGenerator::replying(
            r#"{"email_output": "Dear Ada,", "analysis_rationale": ["wrong key"]}"#,
        );
        let err = improve_email("Dear Ada,", "p", "Ada", &llm).await.unwrap_err();
        assert!(matches!(err, ComposeError::Parse(_)));
    }

    #[test]
    fn test_salutation_for_unknown_recipient() {
        assert_eq!(
            ensure_salutation("Quick note.".to_string(), None),
            "Dear Sir or Madam,\n\nQuick note."
        );
        assert_eq!(
            ensure_salutation("Dear Bob,\nHi".to_string(), Some("Ada")),
            "Dear Bob,\nHi"
        );
    }
}
