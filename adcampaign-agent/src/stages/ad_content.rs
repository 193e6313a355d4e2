use adcampaign_adapters::{
    BlobStorage, ImageGenerator, PollPolicy, TextGenerator, VideoGenerator, VideoRequest,
    VideoSynthesizer, generate_video_with_polling, save_video,
};
use adcampaign_core::state::{self, ADS, INFLUENCERS, PRODUCT_INFO};
use adcampaign_core::{
    AdAsset, Ads, AdapterResult, EventStream, InfluencerProfile, ProductInfo, Result, Stage,
    StageContext, StageEvent,
};
use adcampaign_telemetry::{Instrument, influencer_span};
use async_stream::stream;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const AD_CONTENT_STAGE: &str = "ad_content_generator";
pub const NO_ADS: &str = "No ad content generated.";

const REQUIRED_KEYS: &[&str] = &[PRODUCT_INFO.name(), INFLUENCERS.name()];
const OUTPUT_KEYS: &[&str] = &[ADS.name()];

/// Adapters the ad content stage drives for every influencer.
#[derive(Clone)]
pub struct AdContentAdapters {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub video: Arc<dyn VideoGenerator>,
    pub synthesizer: Arc<dyn VideoSynthesizer>,
    /// When set, generated images are uploaded and the public URL is kept.
    pub storage: Option<Arc<dyn BlobStorage>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub asset_dir: PathBuf,
    pub poll: PollPolicy,
    pub video_duration_secs: u32,
    /// `gs://` prefix handed to the video service for its output.
    pub video_storage_uri: Option<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("campaign_assets"),
            poll: PollPolicy::default(),
            video_duration_secs: 8,
            video_storage_uri: None,
        }
    }
}

impl AssetConfig {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self { asset_dir: asset_dir.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn with_video_storage_uri(mut self, uri: impl Into<String>) -> Self {
        self.video_storage_uri = Some(uri.into());
        self
    }
}

/// Handle without `@`, reduced to `[A-Za-z0-9_]` so it is safe as a path segment.
pub fn slug(handle: &str) -> String {
    let slug: String =
        handle.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    if slug.is_empty() { "unknown".to_string() } else { slug }
}

pub fn ad_copy_prompt(product: &ProductInfo, influencer: &InfluencerProfile) -> String {
    format!(
        "You are a creative ad copywriter. Your task is to generate a short, punchy ad for {}. \
         The product is designed for {} and offers features like {}.\n\
         The ad should match the tone of the influencer @{} - here is their bio: \"{}\".\n\
         Keep the tone natural and compelling. End with a strong call to action.",
        product.name,
        product.target_audience,
        product.features_list(),
        slug(&influencer.handle),
        influencer.bio
    )
}

pub fn image_prompt(product: &ProductInfo) -> String {
    format!(
        "Create a vibrant promotional image for {} featuring {} for {}.",
        product.name,
        product.features_list(),
        product.target_audience
    )
}

pub fn video_script_prompt(product: &ProductInfo, influencer: &InfluencerProfile) -> String {
    format!(
        "Write a short 8 second video ad script for {}. \
         The product features are: {}. \
         Target audience: {}. \
         Style it for social media (Instagram Reels, TikTok). \
         Tone should match the influencer @{} whose bio is: '{}'. \
         Include visual actions, music suggestions, and captions if possible.",
        product.name,
        product.features_list(),
        product.target_audience,
        slug(&influencer.handle),
        influencer.bio
    )
}

/// Copy used when the text model is unavailable.
pub fn template_copy(product: &ProductInfo) -> String {
    let mut copy = format!("Meet {}", product.name);
    if !product.description.is_empty() {
        copy.push_str(&format!(": {}", product.description));
    }
    copy.push('.');
    if !product.features.is_empty() {
        copy.push_str(&format!(" {}.", product.features_list()));
    }
    if !product.target_audience.is_empty() {
        copy.push_str(&format!(" Made for {}.", product.target_audience));
    }
    copy.push_str(" Get yours today!");
    copy
}

pub fn summarize_asset(handle: &str, asset: &AdAsset) -> String {
    format!(
        "Ad for @{}:\n{}\nImage: {}\nVideo: {}",
        slug(handle),
        asset.ad_text,
        asset.image_reference.as_deref().unwrap_or("none"),
        asset.video_reference.as_deref().unwrap_or("none")
    )
}

struct AssetWorker {
    adapters: AdContentAdapters,
    config: AssetConfig,
}

impl AssetWorker {
    /// Produces the full asset set for one influencer. Every adapter failure
    /// degrades a single field; nothing here aborts the run.
    async fn build(&self, product: &ProductInfo, influencer: &InfluencerProfile) -> AdAsset {
        let dir = self.config.asset_dir.join(slug(&influencer.handle));
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot create asset directory");
        }

        let ad_text = match self.adapters.text.generate(&ad_copy_prompt(product, influencer)).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "ad copy generation failed; using template copy");
                template_copy(product)
            }
        };

        let (image_path, image_reference) = match self.image(product, influencer, &dir).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "image generation failed");
                (None, None)
            }
        };

        let video_script = video_script_prompt(product, influencer);
        let video_reference = self.video(&video_script, &ad_text, image_path.as_deref(), &dir).await;

        if let Err(e) = tokio::fs::write(dir.join("ad_text.txt"), &ad_text).await {
            tracing::warn!(error = %e, "failed to export ad text");
        }

        AdAsset { ad_text, image_reference, video_script: Some(video_script), video_reference }
    }

    /// Returns the local image path and the reference stored in `ads`.
    async fn image(
        &self,
        product: &ProductInfo,
        influencer: &InfluencerProfile,
        dir: &Path,
    ) -> AdapterResult<(Option<PathBuf>, Option<String>)> {
        let images = self.adapters.image.generate(&image_prompt(product), 1).await?;
        let Some(image) = images.into_iter().next() else {
            return Ok((None, None));
        };
        let path = dir.join(format!("ad_image.{}", image.extension()));
        tokio::fs::write(&path, &image.bytes).await?;

        let Some(storage) = &self.adapters.storage else {
            let local = path.to_string_lossy().into_owned();
            return Ok((Some(path), Some(local)));
        };
        let destination = format!(
            "campaign_assets/{}/{}_ad_image.{}",
            product.name.replace(' ', "_"),
            slug(&influencer.handle),
            image.extension()
        );
        match storage.upload(&path, &destination).await {
            Ok(url) => Ok((Some(path), Some(url))),
            Err(e) => {
                tracing::warn!(error = %e, "image upload failed");
                Ok((Some(path), None))
            }
        }
    }

    async fn video(
        &self,
        script: &str,
        caption: &str,
        background: Option<&Path>,
        dir: &Path,
    ) -> Option<String> {
        let mut request = VideoRequest::new(script);
        request.duration_seconds = self.config.video_duration_secs;
        if let Some(uri) = &self.config.video_storage_uri {
            request = request.with_storage_uri(uri.clone());
        }

        match generate_video_with_polling(self.adapters.video.as_ref(), &request, &self.config.poll).await {
            Ok(video) => match save_video(&video, &dir.join("ad_video.mp4")).await {
                Ok(reference) => return Some(reference),
                Err(e) => tracing::warn!(error = %e, "saving generated video failed; rendering fallback"),
            },
            Err(e) if e.is_timeout() => {
                tracing::warn!(error = %e, "video generation timed out; rendering fallback")
            }
            Err(e) => tracing::warn!(error = %e, "video generation failed; rendering fallback"),
        }

        let output = dir.join("fallback_video.mp4");
        match self.adapters.synthesizer.render(caption, background, &output).await {
            Ok(()) => Some(output.to_string_lossy().into_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "fallback video rendering failed");
                None
            }
        }
    }
}

/// Generates copy, an image and a video for every discovered influencer.
pub struct AdContentStage {
    description: String,
    worker: Arc<AssetWorker>,
}

impl AdContentStage {
    pub fn new(adapters: AdContentAdapters, config: AssetConfig) -> Self {
        Self {
            description: "Generates ad copy, image and video per influencer".to_string(),
            worker: Arc::new(AssetWorker { adapters, config }),
        }
    }
}

#[async_trait]
impl Stage for AdContentStage {
    fn name(&self) -> &str {
        AD_CONTENT_STAGE
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
        let product = state::require(ctx.store(), AD_CONTENT_STAGE, PRODUCT_INFO)?;
        let influencers = state::require(ctx.store(), AD_CONTENT_STAGE, INFLUENCERS)?;
        let worker = self.worker.clone();

        let s = stream! {
            let mut ads = Ads::new();

            for influencer in &influencers {
                let asset = worker
                    .build(&product, influencer)
                    .instrument(influencer_span(&influencer.handle))
                    .await;
                yield Ok(StageEvent::new(
                    ctx.invocation_id(),
                    AD_CONTENT_STAGE,
                    summarize_asset(&influencer.handle, &asset),
                ));
                ads.insert(influencer.handle.clone(), asset);
            }

            if let Err(e) = state::write(ctx.store(), ADS, &ads) {
                yield Err(e);
                return;
            }
            tracing::info!(count = ads.len(), "ad content stored");

            if ads.is_empty() {
                yield Ok(StageEvent::new(ctx.invocation_id(), AD_CONTENT_STAGE, NO_ADS));
            }
        };

        Ok(Box::pin(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductInfo {
        ProductInfo {
            name: "EcoBottle".into(),
            description: "a reusable water bottle".into(),
            features: vec!["insulated".into(), "leak-proof".into()],
            target_audience: "eco-conscious millennials".into(),
        }
    }

    fn influencer() -> InfluencerProfile {
        InfluencerProfile {
            username: "green_guru".into(),
            followers_count: 25_000,
            bio: "Zero waste living".into(),
            match_score: 2.0,
            relevance_reason: String::new(),
            handle: "@green_guru".into(),
        }
    }

    #[test]
    fn test_prompts_mention_influencer_once() {
        let copy = ad_copy_prompt(&product(), &influencer());
        assert!(copy.contains("@green_guru - here is their bio: \"Zero waste living\""));
        assert!(!copy.contains("@@"));
        assert!(video_script_prompt(&product(), &influencer()).starts_with("Write a short 8 second video ad script for EcoBottle."));
        assert_eq!(
            image_prompt(&product()),
            "Create a vibrant promotional image for EcoBottle featuring insulated, leak-proof for eco-conscious millennials."
        );
    }

    #[test]
    fn test_slug_is_path_safe() {
        assert_eq!(slug("@green_guru"), "green_guru");
        assert_eq!(slug("@../../etc/passwd"), "etcpasswd");
        assert_eq!(slug("@/"), "unknown");
    }

    #[test]
    fn test_template_copy() {
        assert_eq!(
            template_copy(&product()),
            "Meet EcoBottle: a reusable water bottle. insulated, leak-proof. Made for eco-conscious millennials. Get yours today!"
        );
        let bare = ProductInfo { name: "X".into(), description: String::new(), features: vec![], target_audience: String::new() };
        assert_eq!(template_copy(&bare), "Meet X. Get yours today!");
    }

    #[test]
    fn test_summarize_asset_with_missing_media() {
        let asset = AdAsset { ad_text: "Sip sustainably.".into(), ..Default::default() };
        assert_eq!(summarize_asset("@green_guru", &asset), "Ad for @green_guru:\nSip sustainably.\nImage: none\nVideo: none");
    }
}
