use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::profile::{Education, Experience, FetchError, ProfileRecord};
use crate::routes::required;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScrapeProfileRequest {
    pub url: Option<String>,
}

/// Wire shape of the browser-scraped profile.
#[derive(Debug, Serialize)]
pub struct ScrapedProfileResponse {
    pub name: String,
    pub about: String,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub skills: Vec<String>,
    pub accomplishments: Vec<String>,
}

impl From<ProfileRecord> for ScrapedProfileResponse {
    fn from(profile: ProfileRecord) -> Self {
        Self {
            name: profile.full_name,
            about: profile.about,
            experiences: profile.experiences,
            educations: profile.educations,
            skills: profile.skills,
            accomplishments: profile.accomplishments,
        }
    }
}

/// POST /scrape-linkedin-profile
pub async fn handle_scrape_profile(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeProfileRequest>, JsonRejection>,
) -> Result<Json<ScrapedProfileResponse>, AppError> {
    let Json(request) = payload?;
    let url = required(request.url)
        .ok_or_else(|| AppError::Validation("Missing URL in request".to_string()))?;
    info!("Received request to scrape LinkedIn profile: {url}");

    // The pipeline checks the deadline itself and always closes its session before
    // the blocking task completes.
    let deadline = Instant::now() + state.config.request_timeout();
    let profile = state
        .browser
        .fetch(&url, deadline)
        .await
        .map_err(|e| match e {
            FetchError::DeadlineExceeded(_) => AppError::Timeout(state.config.request_timeout_secs),
            other => AppError::from(other),
        })?;
    Ok(Json(ScrapedProfileResponse::from(profile)))
}
