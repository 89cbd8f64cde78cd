pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::email::handlers::{handle_compose, handle_improve};
use crate::profile::handlers::handle_scrape_profile;
use crate::state::AppState;

/// Blank strings in request bodies count as missing.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/scrape-linkedin", post(handle_compose))
        .route("/improve-email", post(handle_improve))
        .route("/scrape-linkedin-profile", post(handle_scrape_profile))
        .with_state(state)
}
