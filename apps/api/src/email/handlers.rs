//! Axum route handlers for drafting and revising emails.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::email::{compose_email, improve_email, DEFAULT_RECIPIENT};
use crate::errors::AppError;
use crate::routes::required;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub url: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ComposeResponse {
    /// Contact email from the profile, empty when the actor found none.
    pub email: String,
    pub groq_response: String,
    pub analysis_rationale: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub email: Option<String>,
    pub prompt: Option<String>,
    pub recipient_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImproveResponse {
    pub improved_email: String,
    pub improvement_rationale: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /scrape-linkedin
///
/// Full pipeline: fetch the profile through the actor, then draft an email from it.
pub async fn handle_compose(
    State(state): State<AppState>,
    payload: Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<ComposeResponse>, AppError> {
    let Json(request) = payload?;
    let url = required(request.url)
        .ok_or_else(|| AppError::Validation("Missing URL in request".to_string()))?;
    let prompt = required(request.prompt)
        .ok_or_else(|| AppError::Validation("Missing prompt in request".to_string()))?;

    state
        .within_deadline(async {
            let profile = state.profiles.fetch(&url).await?;
            let draft = compose_email(&profile, &prompt, state.llm.as_ref()).await?;
            Ok::<_, AppError>(Json(ComposeResponse {
                email: profile.email,
                groq_response: draft.body,
                analysis_rationale: draft.rationale,
            }))
        })
        .await
}

/// POST /improve-email
///
/// Revises an existing draft. No profile fetch involved.
pub async fn handle_improve(
    State(state): State<AppState>,
    payload: Result<Json<ImproveRequest>, JsonRejection>,
) -> Result<Json<ImproveResponse>, AppError> {
    let Json(request) = payload?;
    let (Some(email), Some(prompt)) = (required(request.email), required(request.prompt)) else {
        return Err(AppError::Validation(
            "Missing email or prompt in request".to_string(),
        ));
    };
    let recipient_name =
        required(request.recipient_name).unwrap_or_else(|| DEFAULT_RECIPIENT.to_string());

    state
        .within_deadline(async {
            let draft = improve_email(&email, &prompt, &recipient_name, state.llm.as_ref()).await?;
            Ok::<_, AppError>(Json(ImproveResponse {
                improved_email: draft.body,
                improvement_rationale: draft.rationale,
            }))
        })
        .await
}
