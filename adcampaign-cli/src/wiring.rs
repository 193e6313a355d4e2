use crate::config::{CampaignConfig, DataMode, load_twitter_bearer};
use adcampaign_adapters::{
    BlobStorage, FfmpegSynthesizer, GcsStorage, GeminiTextModel, ImagenClient, LocalStorage,
    TwitterClient, VeoClient, VertexConfig,
};
use adcampaign_agent::{AdContentAdapters, AssetConfig, DataSource, PaginationPolicy, campaign_pipeline};
use adcampaign_runner::{Runner, RunnerConfig};
use adcampaign_session::InMemorySessionService;
use adcampaign_telemetry::LogFormat;
use anyhow::{Result, anyhow};
use std::sync::Arc;

/// Console logging, plus OTLP span export when an endpoint is configured.
pub fn init_telemetry(config: &CampaignConfig, format: LogFormat) -> Result<()> {
    let result = match &config.telemetry.otlp_endpoint {
        Some(endpoint) => adcampaign_telemetry::init_with_otlp(&config.app_name, endpoint, format),
        None => adcampaign_telemetry::init_telemetry_with_format(&config.app_name, format),
    };
    result.map_err(|e| anyhow!("failed to initialize telemetry: {e}"))
}

/// Picks the social data source for the configured mode.
pub fn data_source(config: &CampaignConfig) -> Result<DataSource> {
    match config.mode {
        DataMode::Mock => Ok(DataSource::Fixtures { dir: config.fixtures_dir.clone() }),
        DataMode::Live => {
            let bearer = load_twitter_bearer(&config.twitter_config)?;
            Ok(DataSource::Live {
                search: Arc::new(TwitterClient::new(bearer)),
                pagination: PaginationPolicy::default(),
            })
        }
    }
}

fn storage(config: &CampaignConfig, access_token: &str) -> Option<Arc<dyn BlobStorage>> {
    if let Some(bucket) = &config.storage.gcs_bucket {
        return Some(Arc::new(GcsStorage::new(bucket.clone(), access_token)));
    }
    config
        .storage
        .local_dir
        .as_ref()
        .map(|dir| Arc::new(LocalStorage::new(dir.clone())) as Arc<dyn BlobStorage>)
}

/// Builds the live generation adapters.
pub fn adapters(config: &CampaignConfig) -> Result<AdContentAdapters> {
    let (project, token) = config.vertex_credentials()?;
    let vertex = VertexConfig::new(project, config.vertex.location.clone(), token);

    Ok(AdContentAdapters {
        text: Arc::new(GeminiTextModel::new(config.gemini_api_key()?, config.gemini.model.clone())?),
        image: Arc::new(ImagenClient::new(vertex.clone()).with_model(config.vertex.image_model.clone())),
        video: Arc::new(VeoClient::new(vertex).with_model(config.vertex.video_model.clone())),
        synthesizer: Arc::new(FfmpegSynthesizer::new()),
        storage: storage(config, token),
    })
}

pub fn asset_config(config: &CampaignConfig) -> AssetConfig {
    let assets = AssetConfig::new(config.asset_dir.clone());
    match &config.vertex.video_output_uri {
        Some(uri) => assets.with_video_storage_uri(uri.clone()),
        None => assets,
    }
}

/// Wires adapters, pipeline and an in-memory session service into a runner.
pub fn build_runner(config: &CampaignConfig) -> Result<Runner> {
    let pipeline = campaign_pipeline(adapters(config)?, data_source(config)?, asset_config(config));
    tracing::info!(mode = ?config.mode, assets = %config.asset_dir.display(), "campaign pipeline ready");

    Ok(Runner::new(RunnerConfig {
        app_name: config.app_name.clone(),
        pipeline: Arc::new(pipeline),
        session_service: Arc::new(InMemorySessionService::new().with_max_sessions(config.max_sessions)),
    }))
}
