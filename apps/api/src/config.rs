use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Command-line flags. `PORT` in the environment wins over `--port`.
#[derive(Debug, Parser)]
#[command(name = "outreach", version, about = "Start the API server")]
pub struct Cli {
    /// Port to run the server on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// LinkedIn login used by the browser fallback.
#[derive(Clone)]
pub struct LinkedInCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LinkedInCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration loaded from environment variables.
///
/// Credentials are optional: a missing one only disables the endpoint that needs it,
/// which then reports a configuration error per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub apify_api_token: Option<String>,
    pub google_api_key: Option<String>,
    pub linkedin: Option<LinkedInCredentials>,
    pub chrome_path: Option<PathBuf>,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env(cli: &Cli) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let linkedin = match (
            optional_env("LINKEDIN_EMAIL"),
            optional_env("LINKEDIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(LinkedInCredentials { email, password }),
            _ => None,
        };

        Ok(Config {
            apify_api_token: optional_env("APIFY_API_TOKEN"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            linkedin,
            chrome_path: optional_env("CHROME_PATH").map(PathBuf::from),
            port: match optional_env("PORT") {
                Some(port) => port
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => cli.port,
            },
            request_timeout_secs: optional_env("REQUEST_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Reads an env var, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_port_defaults_to_5000() {
        let cli = Cli::parse_from(["outreach"]);
        assert_eq!(cli.port, 5000);
    }

    #[test]
    fn test_cli_port_flag_is_parsed() {
        let cli = Cli::parse_from(["outreach", "--port", "8081"]);
        assert_eq!(cli.port, 8081);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = LinkedInCredentials {
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_request_timeout_converts_seconds() {
        let config = Config {
            apify_api_token: None,
            google_api_key: None,
            linkedin: None,
            chrome_path: None,
            port: 5000,
            request_timeout_secs: 42,
            rust_log: "info".to_string(),
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(42));
    }
}
