use adcampaign_adapters::{Post, SocialSearch, load_social_metrics};
use adcampaign_core::state::{self, PRODUCT_INFO, SOCIAL_METRICS};
use adcampaign_core::{
    EventStream, ProductInfo, Result, SocialMetrics, Stage, StageContext, StageEvent,
};
use async_stream::stream;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const SOCIAL_METRICS_STAGE: &str = "social_metrics_agent";

const REQUIRED_KEYS: &[&str] = &[PRODUCT_INFO.name()];
const OUTPUT_KEYS: &[&str] = &[SOCIAL_METRICS.name()];

/// Limits on how much live search a single run may do.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationPolicy {
    pub max_pages: u32,
    pub target_results: usize,
    pub page_size: u32,
    pub page_delay: Duration,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self { max_pages: 5, target_results: 50, page_size: 25, page_delay: Duration::from_secs(1) }
    }
}

impl PaginationPolicy {
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn with_target_results(mut self, target_results: usize) -> Self {
        self.target_results = target_results;
        self
    }

    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }
}

/// Where social metrics come from.
#[derive(Clone)]
pub enum MetricsSource {
    /// A `SocialMetrics` JSON file, loaded verbatim.
    Fixture(PathBuf),
    Live { search: Arc<dyn SocialSearch>, policy: PaginationPolicy },
}

/// Features followed by the product name, joined with `OR`.
pub fn build_query(product: &ProductInfo) -> String {
    product.keywords().join(" OR ")
}

/// Counts `#` tokens as hashtags and `@` tokens as mentions, in discovery order.
pub fn extract_metrics(posts: &[Post]) -> SocialMetrics {
    let mut metrics = SocialMetrics { tweet_count: posts.len() as u64, ..Default::default() };
    for post in posts {
        for word in post.text.split_whitespace() {
            if word.starts_with('#') {
                *metrics.hashtags.entry(word.to_string()).or_insert(0) += 1;
            } else if word.starts_with('@') {
                *metrics.mentions.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }
    metrics
}

/// Pages through search results within `policy`. A failed page ends the
/// walk; whatever was collected so far is kept.
pub async fn collect_posts(
    search: &dyn SocialSearch,
    query: &str,
    policy: &PaginationPolicy,
) -> Vec<Post> {
    let mut posts = Vec::new();
    let mut page_token: Option<String> = None;

    for page in 0..policy.max_pages {
        if posts.len() >= policy.target_results {
            break;
        }
        let result = match search.search(query, policy.page_size, page_token.as_deref()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(page, error = %e, "social search failed; stopping pagination");
                break;
            }
        };
        tracing::debug!(page, fetched = result.results.len(), "search page fetched");
        posts.extend(result.results);

        page_token = result.next_page_token;
        if page_token.is_none() {
            break;
        }
        if page + 1 < policy.max_pages && posts.len() < policy.target_results {
            tokio::time::sleep(policy.page_delay).await;
        }
    }

    posts.truncate(policy.target_results);
    posts
}

pub fn summarize(metrics: &SocialMetrics) -> String {
    let hashtags = serde_json::to_string(&metrics.hashtags).unwrap_or_default();
    let mentions = serde_json::to_string(&metrics.mentions).unwrap_or_default();
    format!(
        "Social Metrics:\n- tweet_count: {}\n- hashtags: {hashtags}\n- mentions: {mentions}",
        metrics.tweet_count
    )
}

/// Measures social chatter about the product.
pub struct SocialMetricsStage {
    description: String,
    source: MetricsSource,
}

impl SocialMetricsStage {
    pub fn new(source: MetricsSource) -> Self {
        Self { description: "Collects hashtag and mention counts for the product".to_string(), source }
    }
}

#[async_trait]
impl Stage for SocialMetricsStage {
    fn name(&self) -> &str {
        SOCIAL_METRICS_STAGE
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
        let product = state::require(ctx.store(), SOCIAL_METRICS_STAGE, PRODUCT_INFO)?;
        let source = self.source.clone();

        let s = stream! {
            let query = build_query(&product);
            let metrics = match source {
                MetricsSource::Fixture(path) => {
                    tracing::info!(path = %path.display(), "using social metrics fixture");
                    match load_social_metrics(&path).await {
                        Ok(metrics) => metrics,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
                MetricsSource::Live { search, policy } => {
                    tracing::info!(query = %query, "searching social posts");
                    let posts = collect_posts(search.as_ref(), &query, &policy).await;
                    extract_metrics(&posts)
                }
            };

            if let Err(e) = state::write(ctx.store(), SOCIAL_METRICS, &metrics) {
                yield Err(e);
                return;
            }
            yield Ok(StageEvent::new(ctx.invocation_id(), SOCIAL_METRICS_STAGE, summarize(&metrics)));
        };

        Ok(Box::pin(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcampaign_adapters::MockSocialSearch;

    fn product() -> ProductInfo {
        ProductInfo {
            name: "EcoBottle".into(),
            description: String::new(),
            features: vec!["insulated".into(), "leak-proof".into()],
            target_audience: String::new(),
        }
    }

    #[test]
    fn test_build_query() {
        assert_eq!(build_query(&product()), "insulated OR leak-proof OR EcoBottle");
    }

    #[test]
    fn test_extract_metrics_counts_tokens() {
        let posts = vec![
            Post::new("1", "Loving #EcoBottle with @green_guru #hydrate"),
            Post::new("2", "@green_guru: #EcoBottle rocks"),
        ];
        let metrics = extract_metrics(&posts);
        assert_eq!(metrics.tweet_count, 2);
        assert_eq!(metrics.hashtags["#EcoBottle"], 2);
        assert_eq!(metrics.hashtags["#hydrate"], 1);
        assert_eq!(metrics.mentions["@green_guru"], 1);
        assert_eq!(metrics.mentions["@green_guru:"], 1);
        assert_eq!(metrics.hashtags.keys().collect::<Vec<_>>(), vec!["#EcoBottle", "#hydrate"]);
    }

    #[test]
    fn test_extract_metrics_empty() {
        assert_eq!(extract_metrics(&[]), SocialMetrics::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_never_exceeds_page_cap() {
        let search = MockSocialSearch::endless(5);
        let policy = PaginationPolicy::default().with_max_pages(3).with_target_results(1_000);

        let posts = collect_posts(&search, "q", &policy).await;

        assert_eq!(search.search_count(), 3);
        assert_eq!(posts.len(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_stops_at_target() {
        let search = MockSocialSearch::endless(25);
        let posts = collect_posts(&search, "q", &PaginationPolicy::default()).await;

        assert_eq!(search.search_count(), 2);
        assert_eq!(posts.len(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_follows_tokens_and_stops_without_one() {
        let search = MockSocialSearch::new()
            .with_page(&["#a"], Some("t1"))
            .with_page(&["#b"], None)
            .with_page(&["#never"], None);

        let posts = collect_posts(&search, "q", &PaginationPolicy::default()).await;

        assert_eq!(posts.len(), 2);
        assert_eq!(search.search_tokens(), vec![None, Some("t1".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_page_keeps_partial_results() {
        let search = MockSocialSearch::endless(10).with_failure_on_call(1);
        let posts = collect_posts(&search, "q", &PaginationPolicy::default()).await;

        assert_eq!(posts.len(), 10);
        assert_eq!(search.search_count(), 2);
    }
}
