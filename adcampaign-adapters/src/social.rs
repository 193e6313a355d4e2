//! Social search against the Twitter v2 REST API.

use crate::http::{check_response, transport_error};
use adcampaign_core::{AdapterError, AdapterResult};
use adcampaign_telemetry::{Instrument, adapter_call_span};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const TWITTER_BASE_URL: &str = "https://api.twitter.com";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), author_id: None }
    }
}

/// One page of search results plus the token for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<Post>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialProfile {
    pub username: String,
    pub name: String,
    pub description: String,
    pub followers_count: u64,
}

#[async_trait]
pub trait SocialSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> AdapterResult<SearchPage>;

    /// Resolves a username to its public profile. `Ok(None)` when no such user exists.
    async fn lookup_profile(&self, username: &str) -> AdapterResult<Option<SocialProfile>>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Post>,
    #[serde(default)]
    meta: SearchMeta,
}

#[derive(Deserialize, Default)]
struct SearchMeta {
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct UserResponse {
    data: Option<UserData>,
}

#[derive(Deserialize)]
struct UserData {
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Deserialize, Default)]
struct PublicMetrics {
    #[serde(default)]
    followers_count: u64,
}

impl From<UserData> for SocialProfile {
    fn from(user: UserData) -> Self {
        Self {
            username: user.username,
            name: user.name,
            description: user.description,
            followers_count: user.public_metrics.followers_count,
        }
    }
}

/// Bearer-token client for the recent-search and user-lookup endpoints.
pub struct TwitterClient {
    client: Client,
    bearer_token: String,
    base_url: String,
}

impl TwitterClient {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bearer_token: bearer_token.into(),
            base_url: TWITTER_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SocialSearch for TwitterClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> AdapterResult<SearchPage> {
        let mut params = vec![
            ("query", query.to_string()),
            ("max_results", max_results.to_string()),
            ("tweet.fields", "author_id,created_at,text".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("next_token", token.to_string()));
        }

        async {
            let response = self
                .client
                .get(self.url("/2/tweets/search/recent"))
                .bearer_auth(&self.bearer_token)
                .query(&params)
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_response(response).await?;
            let parsed: SearchResponse = response.json().await.map_err(transport_error)?;
            Ok::<_, AdapterError>(SearchPage {
                results: parsed.data,
                next_page_token: parsed.meta.next_token,
            })
        }
        .instrument(adapter_call_span("twitter", "search_recent"))
        .await
    }

    async fn lookup_profile(&self, username: &str) -> AdapterResult<Option<SocialProfile>> {
        let result = async {
            let response = self
                .client
                .get(self.url(&format!("/2/users/by/username/{username}")))
                .bearer_auth(&self.bearer_token)
                .query(&[("user.fields", "description,public_metrics")])
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_response(response).await?;
            let parsed: UserResponse = response.json().await.map_err(transport_error)?;
            Ok::<_, AdapterError>(parsed.data.map(SocialProfile::from))
        }
        .instrument(adapter_call_span("twitter", "lookup_user"))
        .await;

        match result {
            Err(AdapterError::NotFound(_)) => Ok(None),
            other => other,
        }
    }
}
