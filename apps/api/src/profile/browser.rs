//! Browser fallback: logs into LinkedIn with a real account and scrapes the profile page.
//!
//! Flow: Init → LoggedIn → Navigated → Scraped → Done, or Failed from any stage.
//!
//! The automation library is blocking, so the whole pipeline runs on the blocking
//! pool. Every session lives inside a `SessionGuard`, which closes it on drop.
//! The request deadline is checked between stages and between retries, so a late
//! pipeline unwinds (and closes its session) instead of being abandoned.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::extract::{extract_name_fallback, extract_profile};
use super::retry::RetryPolicy;
use super::{FetchError, ProfileRecord};
use crate::config::LinkedInCredentials;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("{0}")]
    Automation(String),
}

impl BrowserError {
    /// Automation hiccups (timeouts, detached nodes, slow loads) are worth another try.
    pub fn is_transient(&self) -> bool {
        matches!(self, BrowserError::Automation(_))
    }
}

/// One isolated browser instance with a single tab.
pub trait BrowserSession {
    fn login(&mut self, credentials: &LinkedInCredentials) -> Result<(), BrowserError>;
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;
    fn title(&mut self) -> Result<String, BrowserError>;
    fn page_html(&mut self) -> Result<String, BrowserError>;
    /// Releases the browser process and its profile directory. Must be idempotent.
    fn close(&mut self);
}

/// Creates fresh sessions. Sessions are never pooled or reused.
pub trait SessionLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// Closes the wrapped session when dropped.
struct SessionGuard(Box<dyn BrowserSession>);

impl Deref for SessionGuard {
    type Target = dyn BrowserSession;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        info!("Closing browser session");
        self.0.close();
    }
}

/// Uniform random pause used to let the page settle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleWindow {
    pub min: Duration,
    pub max: Duration,
}

impl SettleWindow {
    pub const NONE: SettleWindow = SettleWindow {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    /// Sleeps for a sampled pause, cut short at `deadline`.
    fn wait(&self, deadline: Instant) {
        let pause = self
            .sample()
            .min(deadline.saturating_duration_since(Instant::now()));
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BrowserConfig {
    pub retry: RetryPolicy,
    pub after_login: SettleWindow,
    pub after_navigation: SettleWindow,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            after_login: SettleWindow::secs(5, 8),
            after_navigation: SettleWindow::secs(3, 5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStage {
    Init,
    LoggedIn,
    Navigated,
    Scraped,
    Done,
    Failed,
}

/// Where one pipeline run is, and when it has to be finished.
struct Progress {
    stage: ScrapeStage,
    deadline: Instant,
}

impl Progress {
    fn advance(&mut self, next: ScrapeStage) {
        debug!("Browser scrape {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn ensure_time_left(&self) -> Result<(), FetchError> {
        if Instant::now() >= self.deadline {
            return Err(FetchError::DeadlineExceeded(self.stage));
        }
        Ok(())
    }

    /// A failed step past the deadline is reported as the deadline, not the step.
    fn expired_or(&self, err: FetchError) -> FetchError {
        match self.ensure_time_left() {
            Err(expired) => expired,
            Ok(()) => err,
        }
    }
}

fn is_login_page(title: &str) -> bool {
    title.contains("Sign In") || title.contains("Login")
}

/// Maps the profile page title to the upstream status it encodes.
fn check_profile_title(title: &str) -> Result<(), FetchError> {
    if title.contains("Page not found") || title.contains("404") {
        return Err(FetchError::NotFound);
    }
    if title.contains("Access Denied") || title.contains("403") {
        return Err(FetchError::Forbidden);
    }
    Ok(())
}

/// Runs the whole browser pipeline for one profile. Blocking.
///
/// The session is closed by the time this returns, whatever the outcome.
pub fn fetch_via_browser(
    launcher: &dyn SessionLauncher,
    config: &BrowserConfig,
    url: &str,
    credentials: Option<&LinkedInCredentials>,
    deadline: Instant,
) -> Result<ProfileRecord, FetchError> {
    let credentials = credentials
        .filter(|c| !c.email.is_empty() && !c.password.is_empty())
        .ok_or_else(|| {
            error!("LinkedIn credentials not found in environment variables");
            FetchError::Config(
                "LinkedIn credentials not found in environment variables".to_string(),
            )
        })?;

    let mut progress = Progress {
        stage: ScrapeStage::Init,
        deadline,
    };
    let result = run_stages(launcher, config, url, credentials, &mut progress);
    match &result {
        Ok(profile) => {
            progress.advance(ScrapeStage::Done);
            info!("Scraped profile for {}", profile.full_name);
        }
        Err(e) => {
            error!(
                "Browser scrape failed after reaching {:?}: {e}",
                progress.stage
            );
            progress.advance(ScrapeStage::Failed);
        }
    }
    result
}

fn run_stages(
    launcher: &dyn SessionLauncher,
    config: &BrowserConfig,
    url: &str,
    credentials: &LinkedInCredentials,
    progress: &mut Progress,
) -> Result<ProfileRecord, FetchError> {
    progress.ensure_time_left()?;
    info!("Starting browser session");
    let mut session = SessionGuard(
        launcher
            .launch()
            .map_err(|e| FetchError::Launch(e.to_string()))?,
    );

    info!("Logging in to LinkedIn");
    config
        .retry
        .run(
            "LinkedIn login",
            Some(progress.deadline),
            || session.login(credentials),
            BrowserError::is_transient,
        )
        .map_err(|e| progress.expired_or(FetchError::Auth(e.to_string())))?;
    config.after_login.wait(progress.deadline);
    progress.ensure_time_left()?;

    let title = session
        .title()
        .map_err(|e| FetchError::Auth(e.to_string()))?;
    if is_login_page(&title) {
        return Err(FetchError::Auth("Still on login page".to_string()));
    }
    progress.advance(ScrapeStage::LoggedIn);

    info!("Navigating to profile URL: {url}");
    config
        .retry
        .run(
            "Profile navigation",
            Some(progress.deadline),
            || session.navigate(url),
            BrowserError::is_transient,
        )
        .map_err(|e| {
            progress.expired_or(FetchError::Browser(format!(
                "Failed to navigate to profile URL: {e}"
            )))
        })?;
    config.after_navigation.wait(progress.deadline);
    progress.ensure_time_left()?;

    let title = session
        .title()
        .map_err(|e| FetchError::Browser(format!("Failed to read page title: {e}")))?;
    check_profile_title(&title)?;
    progress.advance(ScrapeStage::Navigated);

    let html = session
        .page_html()
        .map_err(|e| FetchError::Scrape(e.to_string()))?;
    let mut page = extract_profile(&html);
    if page.name.is_none() {
        warn!("No name found in the scraped profile, trying fallback extraction");
        let name = extract_name_fallback(&html)
            .ok_or_else(|| FetchError::Scrape("no profile name found on page".to_string()))?;
        info!("Using fallback name extraction");
        page.name = Some(name);
    }
    progress.advance(ScrapeStage::Scraped);

    Ok(page.into())
}

/// Async front for the browser pipeline, held in `AppState`.
#[derive(Clone)]
pub struct BrowserProfileFetcher {
    launcher: Arc<dyn SessionLauncher>,
    config: BrowserConfig,
    credentials: Option<LinkedInCredentials>,
}

impl BrowserProfileFetcher {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        config: BrowserConfig,
        credentials: Option<LinkedInCredentials>,
    ) -> Self {
        Self {
            launcher,
            config,
            credentials,
        }
    }

    /// Runs the pipeline to completion on the blocking pool. The task is always
    /// awaited, so its session is closed before this resolves. `deadline` bounds
    /// the pipeline from the inside.
    pub async fn fetch(&self, url: &str, deadline: Instant) -> Result<ProfileRecord, FetchError> {
        let fetcher = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            fetch_via_browser(
                fetcher.launcher.as_ref(),
                &fetcher.config,
                &url,
                fetcher.credentials.as_ref(),
                deadline,
            )
        })
        .await
        .map_err(|e| FetchError::Browser(format!("Error scraping LinkedIn profile: {e}")))?
    }
}
