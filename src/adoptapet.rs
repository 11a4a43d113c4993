use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::formats::{DetailOutcome, DetailResponse, ListingResponse, RawListing};
use crate::retry::{self, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.adoptapet.com/search";

/// Result window requested from `pets_at_shelter`. No further pages are fetched.
pub const LISTING_WINDOW: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ListingFetchError {
    #[error("GET {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("parse pets_at_shelter response")]
    Payload {
        #[source]
        source: serde_json::Error,
    },
    #[error("pets_at_shelter record {index} has a blank {field}")]
    InvalidRecord { index: usize, field: &'static str },
}

/// Every listing must carry a non-blank id and name.
pub fn validate_listings(listings: &[RawListing]) -> Result<(), ListingFetchError> {
    for (index, listing) in listings.iter().enumerate() {
        if listing.pet_id.trim().is_empty() {
            return Err(ListingFetchError::InvalidRecord {
                index,
                field: "pet_id",
            });
        }
        if listing.pet_name.trim().is_empty() {
            return Err(ListingFetchError::InvalidRecord {
                index,
                field: "pet_name",
            });
        }
    }
    Ok(())
}

/// Upstream pet inventory. Listing failures are fatal; detail lookups are best-effort.
#[async_trait]
pub trait PetSource: Send + Sync {
    async fn pets_at_shelter(&self, shelter_id: &str) -> Result<Vec<RawListing>, ListingFetchError>;
    async fn pet_details(&self, pet_id: &str) -> DetailOutcome;
}

#[derive(Debug, Clone)]
pub struct AdoptapetClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    retry: RetryPolicy,
}

impl AdoptapetClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("parse --base-url")?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("--base-url must be http/https: {base_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            retry,
        })
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/{name}", self.base_url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(None);
        url
    }

    async fn get_text(&self, endpoint: &Url, query: &[(&str, &str)]) -> Result<String, FetchFailure> {
        let attempts = self.retry.attempts();
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let failure = match self.get_once(endpoint, query).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if attempt >= attempts || !failure.is_retryable() {
                return Err(failure);
            }

            let delay = self.retry.backoff(attempt);
            tracing::debug!(
                endpoint = %endpoint,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure,
                "transient upstream failure; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn get_once(&self, endpoint: &Url, query: &[(&str, &str)]) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(endpoint.clone())
            .header(USER_AGENT, concat!("update-pets/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|err| FetchFailure::Transport(err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Status {
                status,
                body: truncate_body(&body),
            });
        }

        response
            .text()
            .await
            .map_err(|err| FetchFailure::Transport(err.without_url()))
    }
}

#[async_trait]
impl PetSource for AdoptapetClient {
    async fn pets_at_shelter(&self, shelter_id: &str) -> Result<Vec<RawListing>, ListingFetchError> {
        let endpoint = self.endpoint("pets_at_shelter");
        let end_number = LISTING_WINDOW.to_string();
        let query = [
            ("key", self.api_key.as_str()),
            ("shelter_id", shelter_id),
            ("start_number", "1"),
            ("end_number", end_number.as_str()),
            ("output", "json"),
        ];

        let body = self
            .get_text(&endpoint, &query)
            .await
            .map_err(|failure| failure.into_listing_error(&endpoint))?;

        let response: ListingResponse =
            serde_json::from_str(&body).map_err(|source| ListingFetchError::Payload { source })?;
        validate_listings(&response.pets)?;
        Ok(response.pets)
    }

    async fn pet_details(&self, pet_id: &str) -> DetailOutcome {
        let endpoint = self.endpoint("pet_details");
        let query = [
            ("key", self.api_key.as_str()),
            ("pet_id", pet_id),
            ("output", "json"),
        ];

        let body = match self.get_text(&endpoint, &query).await {
            Ok(body) => body,
            Err(failure) => {
                tracing::debug!(pet_id, error = %failure, "pet details unavailable");
                return DetailOutcome::NoDetail;
            }
        };

        match serde_json::from_str::<DetailResponse>(&body) {
            Ok(response) => DetailOutcome::from(response.pet),
            Err(err) => {
                tracing::debug!(pet_id, ?err, "pet details payload malformed");
                DetailOutcome::NoDetail
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum FetchFailure {
    #[error("transport: {0}")]
    Transport(reqwest::Error),
    #[error("status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl FetchFailure {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => retry::is_retryable_error(err),
            Self::Status { status, .. } => retry::is_retryable_status(*status),
        }
    }

    fn into_listing_error(self, endpoint: &Url) -> ListingFetchError {
        let endpoint = endpoint.to_string();
        match self {
            Self::Transport(source) => ListingFetchError::Transport { endpoint, source },
            Self::Status { status, body } => ListingFetchError::Status {
                endpoint,
                status,
                body,
            },
        }
    }
}

fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 256;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}
