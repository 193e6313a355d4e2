use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Popularity bonus applies strictly above this follower count.
pub const POPULARITY_THRESHOLD: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
}

impl ProductInfo {
    /// Search keywords: every feature followed by the product name.
    pub fn keywords(&self) -> Vec<&str> {
        self.features.iter().map(String::as_str).chain(std::iter::once(self.name.as_str())).collect()
    }

    pub fn features_list(&self) -> String {
        self.features.join(", ")
    }
}

/// Aggregated social-search results. Tag and handle maps keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialMetrics {
    pub tweet_count: u64,
    #[serde(default)]
    pub hashtags: IndexMap<String, u64>,
    #[serde(default)]
    pub mentions: IndexMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerProfile {
    pub username: String,
    pub followers_count: u64,
    #[serde(default)]
    pub bio: String,
    pub match_score: f64,
    #[serde(default)]
    pub relevance_reason: String,
    pub handle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdAsset {
    pub ad_text: String,
    pub image_reference: Option<String>,
    pub video_script: Option<String>,
    pub video_reference: Option<String>,
}

/// Generated assets keyed by influencer handle.
pub type Ads = BTreeMap<String, AdAsset>;
