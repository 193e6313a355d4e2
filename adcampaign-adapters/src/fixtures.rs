//! Local JSON fixtures used in place of live social search.

use adcampaign_core::{InfluencerProfile, Result, SocialMetrics};
use serde::de::DeserializeOwned;
use std::path::Path;

pub const SOCIAL_METRICS_FIXTURE: &str = "twitter_mentions.json";
pub const INFLUENCERS_FIXTURE: &str = "influencers.json";

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path).await.inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to read fixture");
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Loads a `SocialMetrics` object verbatim.
pub async fn load_social_metrics(path: &Path) -> Result<SocialMetrics> {
    load_json(path).await
}

/// Loads a list of influencer profiles verbatim.
pub async fn load_influencers(path: &Path) -> Result<Vec<InfluencerProfile>> {
    load_json(path).await
}
