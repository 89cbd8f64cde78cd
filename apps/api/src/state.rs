use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::profile::browser::BrowserProfileFetcher;
use crate::profile::ProfileSource;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutable; each request builds its own pipeline state.
#[derive(Clone)]
pub struct AppState {
    /// Primary fetch path (Apify actor).
    pub profiles: Arc<dyn ProfileSource>,
    /// Fallback fetch path (logged-in headless browser).
    pub browser: BrowserProfileFetcher,
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
}

impl AppState {
    /// Bounds a request pipeline by the configured end-to-end timeout.
    pub async fn within_deadline<T, F>(&self, pipeline: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.config.request_timeout(), pipeline)
            .await
            .map_err(|_| AppError::Timeout(self.config.request_timeout_secs))?
    }
}
