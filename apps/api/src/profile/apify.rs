//! Apify actor client, the primary profile fetch path.
//!
//! Starts the LinkedIn profile actor, waits for the run to finish, then reads the
//! first record of the run's default dataset. One URL yields one profile, so any
//! further records are ignored.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{FetchError, ProfileRecord, ProfileSource};

const APIFY_API_URL: &str = "https://api.apify.com/v2";
/// LinkedIn profile scraper actor. Fixed upstream id.
pub const ACTOR_ID: &str = "2SyF0bVxmgGr8IVCZ";
/// Server-side wait per request, in seconds (Apify caps this at 60).
const WAIT_FOR_FINISH_SECS: u32 = 60;
const MAX_STATUS_POLLS: u32 = 10;

#[derive(Debug, Serialize)]
struct ActorInput<'a> {
    #[serde(rename = "profileUrls")]
    profile_urls: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: ActorRun,
}

#[derive(Debug, Deserialize)]
struct ActorRun {
    id: String,
    status: String,
    #[serde(rename = "defaultDatasetId")]
    default_dataset_id: Option<String>,
}

impl ActorRun {
    fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_str(),
            "SUCCEEDED" | "FAILED" | "TIMED-OUT" | "ABORTED"
        )
    }
}

/// One dataset record as emitted by the actor. Only the fields we forward are read.
#[derive(Debug, Default, Deserialize)]
struct ProfileItem {
    about: Option<String>,
    headline: Option<String>,
    email: Option<String>,
    #[serde(rename = "fullName")]
    full_name: Option<String>,
}

impl From<ProfileItem> for ProfileRecord {
    fn from(item: ProfileItem) -> Self {
        ProfileRecord {
            full_name: item.full_name.unwrap_or_default(),
            headline: item.headline.unwrap_or_default(),
            about: item.about.unwrap_or_default(),
            email: item.email.unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct ApifyClient {
    client: Client,
    token: Option<String>,
}

impl ApifyClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(u64::from(WAIT_FOR_FINISH_SECS) + 30))
                .build()?,
            token,
        })
    }

    async fn start_run(&self, token: &str, url: &str) -> Result<ActorRun, FetchError> {
        let response = self
            .client
            .post(format!("{APIFY_API_URL}/acts/{ACTOR_ID}/runs"))
            .bearer_auth(token)
            .query(&[("waitForFinish", WAIT_FOR_FINISH_SECS)])
            .json(&ActorInput { profile_urls: [url] })
            .send()
            .await
            .map_err(|e| FetchError::Actor(e.to_string()))?;

        read_run(response).await
    }

    async fn wait_for_run(&self, token: &str, mut run: ActorRun) -> Result<ActorRun, FetchError> {
        let mut polls = 0;
        while !run.is_terminal() {
            if polls == MAX_STATUS_POLLS {
                return Err(FetchError::Actor(format!(
                    "run {} still {} after {} status polls",
                    run.id, run.status, MAX_STATUS_POLLS
                )));
            }
            polls += 1;
            debug!("Actor run {} is {}, polling again", run.id, run.status);

            let response = self
                .client
                .get(format!("{APIFY_API_URL}/actor-runs/{}", run.id))
                .bearer_auth(token)
                .query(&[("waitForFinish", WAIT_FOR_FINISH_SECS)])
                .send()
                .await
                .map_err(|e| FetchError::Actor(e.to_string()))?;
            run = read_run(response).await?;
        }
        Ok(run)
    }

    async fn first_item(&self, token: &str, dataset_id: &str) -> Result<ProfileItem, FetchError> {
        let response = self
            .client
            .get(format!("{APIFY_API_URL}/datasets/{dataset_id}/items"))
            .bearer_auth(token)
            .query(&[("clean", "true"), ("limit", "1"), ("format", "json")])
            .send()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Malformed(format!("status {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        first_profile_item(&body)
    }
}

#[async_trait]
impl ProfileSource for ApifyClient {
    async fn fetch(&self, url: &str) -> Result<ProfileRecord, FetchError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| FetchError::Config("No API token found".to_string()))?;

        info!("Calling APIFY actor for {url}");
        let run = self.start_run(token, url).await?;
        let run = self.wait_for_run(token, run).await?;

        if run.status != "SUCCEEDED" {
            return Err(FetchError::Actor(format!(
                "run {} finished with status {}",
                run.id, run.status
            )));
        }
        let dataset_id = run
            .default_dataset_id
            .ok_or_else(|| FetchError::Malformed("run has no default dataset".to_string()))?;
        info!("APIFY run {} completed with dataset {dataset_id}", run.id);

        let item = self.first_item(token, &dataset_id).await?;
        Ok(item.into())
    }
}

async fn read_run(response: reqwest::Response) -> Result<ActorRun, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Actor(format!("status {status}: {body}")));
    }
    let envelope: RunEnvelope = response
        .json()
        .await
        .map_err(|e| FetchError::Actor(format!("unreadable run object: {e}")))?;
    Ok(envelope.data)
}

/// Decodes a dataset items page and keeps only the first record.
fn first_profile_item(body: &str) -> Result<ProfileItem, FetchError> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let first = items.into_iter().next().ok_or(FetchError::EmptyDataset)?;
    serde_json::from_value(first).map_err(|e| FetchError::Malformed(e.to_string()))
}
