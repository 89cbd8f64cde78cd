//! Production `SessionLauncher` backed by headless Chrome.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::seq::SliceRandom;
use tempfile::TempDir;
use tracing::{debug, info};

use super::browser::{BrowserError, BrowserSession, SessionLauncher};
use crate::config::LinkedInCredentials;

const LOGIN_URL: &str = "https://www.linkedin.com/login";
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(45);
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
];

/// Flags that trim the automation fingerprint and keep Chrome lean in containers.
const CHROME_FLAGS: [&str; 5] = [
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-notifications",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
];

pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

impl SessionLauncher for ChromeLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let user_data_dir = tempfile::Builder::new()
            .prefix("outreach-chrome-")
            .tempdir()
            .map_err(launch_err)?;

        let user_agent_flag = OsString::from(format!("--user-agent={}", pick_user_agent()));
        let mut args: Vec<&OsStr> = CHROME_FLAGS.iter().map(|flag| OsStr::new(*flag)).collect();
        args.push(user_agent_flag.as_os_str());

        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            window_size: Some((1920, 1080)),
            path: self.chrome_path.clone(),
            user_data_dir: Some(user_data_dir.path().to_path_buf()),
            idle_browser_timeout: IDLE_BROWSER_TIMEOUT,
            args,
            ..Default::default()
        };

        debug!("Launching Chrome with profile dir {}", user_data_dir.path().display());
        let browser = Browser::new(options).map_err(launch_err)?;
        let tab = browser.new_tab().map_err(launch_err)?;
        tab.set_default_timeout(PAGE_LOAD_TIMEOUT);
        info!("Chrome session started");

        Ok(Box::new(ChromeSession {
            tab,
            browser: Some(browser),
            user_data_dir: Some(user_data_dir),
        }))
    }
}

struct ChromeSession {
    tab: Arc<Tab>,
    browser: Option<Browser>,
    user_data_dir: Option<TempDir>,
}

fn launch_err(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Launch(e.to_string())
}

fn automation(e: anyhow::Error) -> BrowserError {
    BrowserError::Automation(format!("{e:#}"))
}

impl ChromeSession {
    fn fill_login_form(&self, credentials: &LinkedInCredentials) -> Result<()> {
        self.tab.navigate_to(LOGIN_URL)?.wait_until_navigated()?;
        self.tab.wait_for_element("#username")?.click()?;
        self.tab.type_str(&credentials.email)?;
        self.tab.wait_for_element("#password")?.click()?;
        self.tab.type_str(&credentials.password)?;
        self.tab
            .wait_for_element(r#"button[type="submit"]"#)?
            .click()?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }
}

impl BrowserSession for ChromeSession {
    fn login(&mut self, credentials: &LinkedInCredentials) -> Result<(), BrowserError> {
        self.fill_login_form(credentials).map_err(automation)
    }

    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(automation)
    }

    fn title(&mut self) -> Result<String, BrowserError> {
        self.tab.get_title().map_err(automation)
    }

    fn page_html(&mut self) -> Result<String, BrowserError> {
        self.tab.get_content().map_err(automation)
    }

    fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            if let Err(e) = self.tab.close(true) {
                debug!("Tab close failed during shutdown: {e}");
            }
            // dropping the browser kills the Chrome process
            drop(browser);
        }
        // the profile dir can only go once Chrome has exited
        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = dir.close() {
                debug!("Could not remove Chrome profile dir: {e}");
            }
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.close();
    }
}
