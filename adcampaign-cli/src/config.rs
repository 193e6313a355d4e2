//! Launcher configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! environment variables (a `.env` file is loaded first by the binary).
//!
//! ```toml
//! mode = "mock"
//! asset_dir = "campaign_assets"
//! max_sessions = 100
//!
//! [gemini]
//! model = "gemini-2.0-flash"
//!
//! [vertex]
//! project = "my-project"
//! location = "us-central1"
//!
//! [server]
//! port = 8080
//! allowed_origins = ["https://ads.example.com"]
//!
//! [telemetry]
//! otlp_endpoint = "http://localhost:4317"
//! ```

use adcampaign_adapters::{image::DEFAULT_IMAGE_MODEL, text::DEFAULT_TEXT_MODEL, video::DEFAULT_VIDEO_MODEL};
use adcampaign_session::DEFAULT_MAX_SESSIONS;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where the social stages get their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Local fixture files.
    #[default]
    Mock,
    /// The Twitter API.
    Live,
}

impl std::str::FromStr for DataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "live" => Ok(Self::Live),
            other => bail!("unknown mode '{other}' (expected 'mock' or 'live')"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_key: None, model: DEFAULT_TEXT_MODEL.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VertexSettings {
    pub project: Option<String>,
    pub location: String,
    pub access_token: Option<String>,
    pub image_model: String,
    pub video_model: String,
    /// `gs://` prefix Veo writes finished videos to.
    pub video_output_uri: Option<String>,
}

impl Default for VertexSettings {
    fn default() -> Self {
        Self {
            project: None,
            location: "us-central1".to_string(),
            access_token: None,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            video_output_uri: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Public GCS bucket for uploaded images.
    pub gcs_bucket: Option<String>,
    /// Directory images are copied into when no bucket is configured.
    pub local_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub expose_error_details: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: 8080, allowed_origins: Vec::new(), expose_error_details: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// OTLP/gRPC collector spans are exported to. Console logging only when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub app_name: String,
    pub mode: DataMode,
    /// Finished runs kept for `GET /campaigns/{id}` before the oldest are dropped.
    pub max_sessions: usize,
    pub fixtures_dir: PathBuf,
    pub asset_dir: PathBuf,
    /// YAML file holding `twitter.bearer_token`.
    pub twitter_config: PathBuf,
    pub gemini: GeminiConfig,
    pub vertex: VertexSettings,
    pub storage: StorageConfig,
    pub server: HttpConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            app_name: "adcampaign".to_string(),
            mode: DataMode::Mock,
            max_sessions: DEFAULT_MAX_SESSIONS,
            fixtures_dir: PathBuf::from("fixtures"),
            asset_dir: PathBuf::from("campaign_assets"),
            twitter_config: PathBuf::from("twitter.yml"),
            gemini: GeminiConfig::default(),
            vertex: VertexSettings::default(),
            storage: StorageConfig::default(),
            server: HttpConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl CampaignConfig {
    /// Reads `path` if given, then applies the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Overrides fields from environment variables looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GOOGLE_API_KEY").or_else(|| var("GEMINI_API_KEY")) {
            self.gemini.api_key = Some(key);
        }
        if let Some(project) = var("VERTEX_PROJECT") {
            self.vertex.project = Some(project);
        }
        if let Some(location) = var("VERTEX_LOCATION") {
            self.vertex.location = location;
        }
        if let Some(token) = var("VERTEX_ACCESS_TOKEN") {
            self.vertex.access_token = Some(token);
        }
        if let Some(bucket) = var("GCS_IMAGE_BUCKET") {
            self.storage.gcs_bucket = Some(bucket);
        }
        if let Some(endpoint) = var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            self.telemetry.otlp_endpoint = Some(endpoint);
        }
        if let Some(mode) = var("ADCAMPAIGN_MODE") {
            self.mode = mode.parse()?;
        }
        Ok(())
    }

    pub fn gemini_api_key(&self) -> Result<&str> {
        self.gemini
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GOOGLE_API_KEY or GEMINI_API_KEY environment variable not set"))
    }

    /// Project and access token for Imagen, Veo and GCS.
    pub fn vertex_credentials(&self) -> Result<(&str, &str)> {
        let project =
            self.vertex.project.as_deref().ok_or_else(|| anyhow!("VERTEX_PROJECT is not set"))?;
        let token = self
            .vertex
            .access_token
            .as_deref()
            .ok_or_else(|| anyhow!("VERTEX_ACCESS_TOKEN is not set"))?;
        Ok((project, token))
    }
}

#[derive(Deserialize)]
struct TwitterFile {
    twitter: TwitterSection,
}

#[derive(Deserialize)]
struct TwitterSection {
    bearer_token: String,
}

/// Reads the bearer token from a `twitter.yml` file.
pub fn load_twitter_bearer(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read Twitter credentials {}", path.display()))?;
    let file: TwitterFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("invalid Twitter credentials file {}", path.display()))?;
    if file.twitter.bearer_token.trim().is_empty() {
        bail!("twitter.bearer_token is empty in {}", path.display());
    }
    Ok(file.twitter.bearer_token)
}
