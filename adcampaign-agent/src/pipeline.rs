use crate::stages::{
    AdContentAdapters, AdContentStage, AssetConfig, InfluencerDiscoveryStage, InfluencerSource,
    MetricsSource, PaginationPolicy, ProductInfoStage, SocialMetricsStage,
};
use crate::workflow::SequentialPipeline;
use adcampaign_adapters::SocialSearch;
use adcampaign_adapters::fixtures::{INFLUENCERS_FIXTURE, SOCIAL_METRICS_FIXTURE};
use adcampaign_core::Stage;
use std::path::PathBuf;
use std::sync::Arc;

pub const PIPELINE_NAME: &str = "AdCampaignPipeline";

/// Where the social stages get their data.
#[derive(Clone)]
pub enum DataSource {
    /// `twitter_mentions.json` and `influencers.json` under `dir`.
    Fixtures { dir: PathBuf },
    Live { search: Arc<dyn SocialSearch>, pagination: PaginationPolicy },
}

impl DataSource {
    fn metrics_source(&self) -> MetricsSource {
        match self {
            Self::Fixtures { dir } => MetricsSource::Fixture(dir.join(SOCIAL_METRICS_FIXTURE)),
            Self::Live { search, pagination } => {
                MetricsSource::Live { search: search.clone(), policy: pagination.clone() }
            }
        }
    }

    fn influencer_source(&self) -> InfluencerSource {
        match self {
            Self::Fixtures { dir } => InfluencerSource::Fixture(dir.join(INFLUENCERS_FIXTURE)),
            Self::Live { search, .. } => InfluencerSource::Live(search.clone()),
        }
    }
}

/// Wires the four campaign stages into one sequential pipeline.
///
/// ```rust,ignore
/// let pipeline = campaign_pipeline(
///     adapters,
///     DataSource::Fixtures { dir: "fixtures".into() },
///     AssetConfig::new("campaign_assets"),
/// );
/// ```
pub fn campaign_pipeline(
    adapters: AdContentAdapters,
    data: DataSource,
    assets: AssetConfig,
) -> SequentialPipeline {
    let stages: Vec<Arc<dyn Stage>> = vec![
        Arc::new(ProductInfoStage::new(adapters.text.clone())),
        Arc::new(SocialMetricsStage::new(data.metrics_source())),
        Arc::new(InfluencerDiscoveryStage::new(data.influencer_source())),
        Arc::new(AdContentStage::new(adapters, assets)),
    ];
    SequentialPipeline::new(PIPELINE_NAME, stages)
        .with_description("Sequential pipeline to generate a personalized ad campaign.")
}
