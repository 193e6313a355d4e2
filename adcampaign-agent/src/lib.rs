//! # adcampaign-agent
//!
//! The four campaign stages and the workflow that chains them.
//!
//! - [`ProductInfoStage`] - free text to structured product info
//! - [`SocialMetricsStage`] - hashtag and mention counts
//! - [`InfluencerDiscoveryStage`] - scored, ranked influencer list
//! - [`AdContentStage`] - copy, image and video per influencer
//! - [`SequentialPipeline`] - runs stages once, in order, stopping on the first error
//!
//! [`campaign_pipeline`] assembles the standard pipeline from a set of adapters.

pub mod pipeline;
pub mod stages;
pub mod workflow;

pub use pipeline::{DataSource, PIPELINE_NAME, campaign_pipeline};
pub use stages::{
    AD_CONTENT_STAGE, AdContentAdapters, AdContentStage, AssetConfig, INFLUENCER_DISCOVERY_STAGE,
    InfluencerDiscoveryStage, InfluencerSource, MetricsSource, PRODUCT_INFO_STAGE,
    PaginationPolicy, ProductInfoStage, SOCIAL_METRICS_STAGE, SocialMetricsStage,
};
pub use workflow::SequentialPipeline;
