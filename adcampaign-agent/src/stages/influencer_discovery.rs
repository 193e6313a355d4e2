use adcampaign_adapters::{SocialProfile, SocialSearch, load_influencers};
use adcampaign_core::state::{self, INFLUENCERS, PRODUCT_INFO, SOCIAL_METRICS};
use adcampaign_core::{
    EventStream, InfluencerProfile, POPULARITY_THRESHOLD, ProductInfo, Result, SocialMetrics,
    Stage, StageContext, StageEvent,
};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

pub const INFLUENCER_DISCOVERY_STAGE: &str = "influencer_discovery_agent";
pub const NO_INFLUENCERS: &str = "No relevant influencers found.";

const REQUIRED_KEYS: &[&str] = &[PRODUCT_INFO.name(), SOCIAL_METRICS.name()];
const OUTPUT_KEYS: &[&str] = &[INFLUENCERS.name()];
const SUMMARY_LIMIT: usize = 5;

#[derive(Clone)]
pub enum InfluencerSource {
    /// A JSON list of `InfluencerProfile`, loaded verbatim.
    Fixture(PathBuf),
    Live(Arc<dyn SocialSearch>),
}

/// Leading username of a mention token: `@alice:` and `alice!` both name `alice`.
pub fn normalize_handle(mention: &str) -> &str {
    let name = mention.trim_start_matches('@');
    let end = name
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(name.len());
    &name[..end]
}

/// Scores a bio against the product: one point per keyword found, plus one
/// when the account is above [`POPULARITY_THRESHOLD`] followers.
pub fn match_score(product: &ProductInfo, bio: &str, followers_count: u64) -> (f64, String) {
    let bio = bio.to_lowercase();
    let keywords = std::iter::once(&product.name)
        .chain(product.features.iter())
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty());

    let matched: Vec<String> = keywords.filter(|k| bio.contains(k.as_str())).collect();
    let mut score = matched.len() as f64;
    if followers_count > POPULARITY_THRESHOLD {
        score += 1.0;
    }

    let reason = format!("Matched keywords: {}; Followers: {followers_count}", matched.join(", "));
    (score, reason)
}

/// Scores a looked-up account. The handle is the username the API reports,
/// not the mention token it was found through.
pub fn profile_from(product: &ProductInfo, user: &SocialProfile) -> InfluencerProfile {
    let (match_score, relevance_reason) = match_score(product, &user.description, user.followers_count);
    let handle = normalize_handle(&user.username).to_string();
    InfluencerProfile {
        username: handle.clone(),
        followers_count: user.followers_count,
        bio: user.description.clone(),
        match_score,
        relevance_reason,
        handle,
    }
}

/// Sorts by score, highest first. Equal scores keep their incoming order.
pub fn rank(influencers: &mut [InfluencerProfile]) {
    influencers.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
}

/// Looks up every mentioned handle once, in discovery order. Handles whose
/// lookup misses or fails are skipped.
pub async fn discover(
    search: &dyn SocialSearch,
    product: &ProductInfo,
    metrics: &SocialMetrics,
) -> Vec<InfluencerProfile> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for mention in metrics.mentions.keys() {
        let handle = normalize_handle(mention);
        if handle.is_empty() || !seen.insert(handle.to_ascii_lowercase()) {
            continue;
        }
        match search.lookup_profile(handle).await {
            Ok(Some(user)) if normalize_handle(&user.username).is_empty() => {
                tracing::warn!(handle, "profile carried no usable username; skipping")
            }
            Ok(Some(user)) => found.push(profile_from(product, &user)),
            Ok(None) => tracing::debug!(handle, "no profile for mentioned handle"),
            Err(e) => tracing::warn!(handle, error = %e, "profile lookup failed; skipping"),
        }
    }
    found
}

pub fn summarize(influencers: &[InfluencerProfile]) -> String {
    if influencers.is_empty() {
        return NO_INFLUENCERS.to_string();
    }
    let lines: Vec<String> = influencers
        .iter()
        .take(SUMMARY_LIMIT)
        .map(|i| {
            format!(
                "@{} ({} followers) - Score: {:.2} - {}",
                normalize_handle(&i.username),
                i.followers_count,
                i.match_score,
                i.relevance_reason
            )
        })
        .collect();
    format!("Top influencers:\n{}", lines.join("\n"))
}

/// Finds and ranks accounts worth partnering with.
pub struct InfluencerDiscoveryStage {
    description: String,
    source: InfluencerSource,
}

impl InfluencerDiscoveryStage {
    pub fn new(source: InfluencerSource) -> Self {
        Self { description: "Discovers and ranks relevant influencers".to_string(), source }
    }
}

#[async_trait]
impl Stage for InfluencerDiscoveryStage {
    fn name(&self) -> &str {
        INFLUENCER_DISCOVERY_STAGE
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn required_keys(&self) -> &[&'static str] {
        REQUIRED_KEYS
    }

    fn output_keys(&self) -> &[&'static str] {
        OUTPUT_KEYS
    }

    async fn execute(&self, ctx: Arc<dyn StageContext>) -> Result<EventStream> {
        let product = state::require(ctx.store(), INFLUENCER_DISCOVERY_STAGE, PRODUCT_INFO)?;
        let metrics = state::require(ctx.store(), INFLUENCER_DISCOVERY_STAGE, SOCIAL_METRICS)?;
        let source = self.source.clone();

        let s = stream! {
            let mut influencers = match source {
                InfluencerSource::Fixture(path) => {
                    tracing::info!(path = %path.display(), "using influencer fixture");
                    match load_influencers(&path).await {
                        Ok(influencers) => influencers,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
                InfluencerSource::Live(search) => discover(search.as_ref(), &product, &metrics).await,
            };
            rank(&mut influencers);
            tracing::info!(count = influencers.len(), "influencers ranked");

            if let Err(e) = state::write(ctx.store(), INFLUENCERS, &influencers) {
                yield Err(e);
                return;
            }
            yield Ok(StageEvent::new(
                ctx.invocation_id(),
                INFLUENCER_DISCOVERY_STAGE,
                summarize(&influencers),
            ));
        };

        Ok(Box::pin(s))
    }
}
