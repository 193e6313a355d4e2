pub mod ad_content;
pub mod influencer_discovery;
pub mod product_info;
pub mod social_metrics;

pub use ad_content::{AD_CONTENT_STAGE, AdContentAdapters, AdContentStage, AssetConfig};
pub use influencer_discovery::{
    INFLUENCER_DISCOVERY_STAGE, InfluencerDiscoveryStage, InfluencerSource,
};
pub use product_info::{PRODUCT_INFO_STAGE, ProductInfoStage};
pub use social_metrics::{
    MetricsSource, PaginationPolicy, SOCIAL_METRICS_STAGE, SocialMetricsStage,
};
