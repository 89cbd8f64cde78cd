//! Profile fetching: the Apify actor (primary) and a headless-browser scraper (fallback).
//!
//! Both paths produce the same `ProfileRecord`. Fields a path cannot supply stay empty.

pub mod apify;
pub mod browser;
pub mod chrome;
pub mod extract;
pub mod handlers;
pub mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::browser::ScrapeStage;

/// A single position from the profile's experience section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub date_range: String,
    pub description: String,
}

/// A single entry from the profile's education section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub date_range: String,
}

/// Unified profile shape for both fetch paths.
///
/// The actor fills `full_name`, `headline`, `about` and `email`. The browser fills
/// `full_name`, `about` and the list sections. Nothing here is ever null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub full_name: String,
    pub headline: String,
    pub about: String,
    pub email: String,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub skills: Vec<String>,
    pub accomplishments: Vec<String>,
}

impl ProfileRecord {
    /// First whitespace-delimited token of the full name, if any.
    pub fn first_name(&self) -> Option<&str> {
        self.full_name.split_whitespace().next()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Config(String),

    #[error("APIFY Actor call failed: {0}")]
    Actor(String),

    #[error("Error retrieving data from APIFY: dataset is empty")]
    EmptyDataset,

    #[error("Error retrieving data from APIFY: {0}")]
    Malformed(String),

    #[error("Failed to start browser session: {0}")]
    Launch(String),

    #[error("{0}")]
    Browser(String),

    #[error("Failed to login to LinkedIn: {0}")]
    Auth(String),

    #[error("LinkedIn profile not found (404)")]
    NotFound,

    #[error("Access to this LinkedIn profile is forbidden (403)")]
    Forbidden,

    #[error("Failed to scrape profile: {0}")]
    Scrape(String),

    #[error("Browser scrape ran out of time after reaching {0:?}")]
    DeadlineExceeded(ScrapeStage),
}

/// Fetches a profile by URL. Implemented by `ApifyClient`; tests supply fakes.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProfileRecord, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name_takes_leading_token() {
        let profile = ProfileRecord {
            full_name: "  Ada   King Lovelace ".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.first_name(), Some("Ada"));
    }

    #[test]
    fn test_first_name_none_when_blank() {
        assert_eq!(ProfileRecord::default().first_name(), None);
    }

    #[test]
    fn test_partial_json_defaults_missing_fields() {
        let profile: ProfileRecord =
            serde_json::from_str(r#"{"full_name": "Ada", "experiences": [{"title": "CTO"}]}"#)
                .unwrap();
        assert_eq!(profile.about, "");
        assert_eq!(profile.experiences[0].company, "");
        assert!(profile.skills.is_empty());
    }

    #[test]
    fn test_fetch_error_messages_match_client_contract() {
        assert_eq!(
            FetchError::NotFound.to_string(),
            "LinkedIn profile not found (404)"
        );
        assert_eq!(
            FetchError::Forbidden.to_string(),
            "Access to this LinkedIn profile is forbidden (403)"
        );
        assert_eq!(
            FetchError::Auth("Still on login page".to_string()).to_string(),
            "Failed to login to LinkedIn: Still on login page"
        );
    }
}
