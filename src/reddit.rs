//! reddit.rs
//!
//! Authenticated listing client for the Reddit API. Exchanges client
//! credentials for an application token once, then serves listing pages.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::RedditSettings;
use crate::errors::ScrapeError;
use crate::metrics::{LISTING_HISTOGRAM, LISTING_REQUESTS};
use crate::source::{ListingQuery, Page, PostSource, RawPost, MAX_PAGE_SIZE};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RawPost,
}

/// Reddit API client holding a bearer token for the whole run.
pub struct RedditClient {
    client: Client,
    token: String,
    api_base: Url,
    subreddit: String,
}

impl RedditClient {
    /// Build the HTTP client and exchange the configured credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Auth`] if the token exchange is rejected, or
    /// [`ScrapeError::Fetch`] if the token endpoint cannot be reached.
    pub async fn connect(settings: &RedditSettings) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| ScrapeError::Fetch(settings.auth_url.clone(), e))?;

        // Url::join replaces the last segment unless the base ends in a slash
        let mut base = settings.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base).map_err(|e| invalid_url("api_base_url", e))?;

        let token = fetch_token(&client, settings).await?;
        debug!(subreddit = %settings.subreddit, "Obtained Reddit application token");

        Ok(Self {
            client,
            token,
            api_base,
            subreddit: settings.subreddit.clone(),
        })
    }

    fn listing_url(&self, query: &ListingQuery) -> Result<Url, ScrapeError> {
        let path = format!("r/{}/{}", self.subreddit, query.endpoint());
        self.api_base.join(&path).map_err(|e| invalid_url(&path, e))
    }
}

fn invalid_url(what: &str, err: url::ParseError) -> ScrapeError {
    ScrapeError::Config(config::ConfigError::Message(format!("invalid URL for {what}: {err}")))
}

async fn fetch_token(client: &Client, settings: &RedditSettings) -> Result<String, ScrapeError> {
    let response = client
        .post(&settings.auth_url)
        .basic_auth(&settings.client_id, Some(&settings.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| ScrapeError::Fetch(settings.auth_url.clone(), e))?;

    if !response.status().is_success() {
        return Err(ScrapeError::Auth(format!(
            "token exchange failed with status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ScrapeError::Decode(settings.auth_url.clone(), e))?;

    Ok(token.access_token)
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<Page, ScrapeError> {
        LISTING_REQUESTS.inc();
        let start = Instant::now();

        let url = self.listing_url(query)?;
        let endpoint = url.to_string();

        let mut params: Vec<(&str, String)> = vec![
            ("limit", page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("raw_json", "1".to_string()),
        ];
        match query {
            ListingQuery::Top(window) => params.push(("t", window.as_str().to_string())),
            ListingQuery::Search { term, sort } => {
                params.push(("q", term.clone()));
                params.push(("sort", sort.clone()));
                params.push(("restrict_sr", "true".to_string()));
            }
            ListingQuery::Hot | ListingQuery::New => {}
        }
        if let Some(cursor) = after {
            params.push(("after", cursor.to_string()));
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch(endpoint.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status { endpoint, status });
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| ScrapeError::Decode(endpoint.clone(), e))?;

        LISTING_HISTOGRAM.observe(start.elapsed().as_secs_f64());

        let posts: Vec<RawPost> = listing.data.children.into_iter().map(|c| c.data).collect();
        debug!(
            endpoint = %endpoint,
            count = posts.len(),
            has_next = listing.data.after.is_some(),
            "Fetched listing page"
        );

        Ok(Page {
            posts,
            after: listing.data.after,
        })
    }
}
