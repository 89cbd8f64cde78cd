//! Pulls the JSON object out of free-form model output.
//!
//! Order: the whole text as JSON, then a ```json fenced block, then a bare ``` block.

use serde::de::DeserializeOwned;

use super::ComposeError;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Parses model output into `T`, accepting raw JSON or a fenced block.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, ComposeError> {
    let trimmed = text.trim();
    let strict_err = match serde_json::from_str::<T>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let payload = fenced_block(trimmed).ok_or_else(|| {
        // whole-text JSON of the wrong shape: the serde error says what is missing
        if strict_err.is_data() {
            ComposeError::Parse(strict_err.to_string())
        } else {
            ComposeError::Parse(format!(
                "model output is neither JSON nor a fenced JSON block: {}",
                preview(trimmed)
            ))
        }
    })?;

    serde_json::from_str(payload).map_err(|e| ComposeError::Parse(e.to_string()))
}

/// Contents of the first fenced block, preferring one tagged `json`.
fn fenced_block(text: &str) -> Option<&str> {
    let start = match text.find(JSON_FENCE) {
        Some(i) => i + JSON_FENCE.len(),
        None => text.find(FENCE)? + FENCE.len(),
    };
    let rest = &text[start..];
    // an unterminated fence runs to end of text
    let end = rest.find(FENCE).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}
