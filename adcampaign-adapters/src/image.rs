//! Image generation through the Vertex AI Imagen `predict` endpoint.

use crate::http::{VertexConfig, check_response, transport_error};
use crate::retry::{RetryPolicy, with_retry};
use adcampaign_core::{AdapterError, AdapterResult};
use adcampaign_telemetry::{Instrument, adapter_call_span};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_IMAGE_MODEL: &str = "imagegeneration@006";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    /// File extension matching the MIME type, `png` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates up to `count` images for the prompt.
    async fn generate(&self, prompt: &str, count: u32) -> AdapterResult<Vec<GeneratedImage>>;
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

pub struct ImagenClient {
    client: Client,
    config: VertexConfig,
    model: String,
    retry: RetryPolicy,
}

impl ImagenClient {
    pub fn new(config: VertexConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn predict(&self, body: &serde_json::Value) -> AdapterResult<Vec<GeneratedImage>> {
        let response = self
            .client
            .post(self.config.model_url(&self.model, "predict"))
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_response(response).await?;
        let parsed: PredictResponse = response.json().await.map_err(transport_error)?;
        decode_predictions(parsed)
    }
}

fn decode_predictions(response: PredictResponse) -> AdapterResult<Vec<GeneratedImage>> {
    if response.predictions.is_empty() {
        return Err(AdapterError::InvalidResponse("no images returned".into()));
    }
    response
        .predictions
        .into_iter()
        .map(|prediction| {
            let encoded = prediction.bytes_base64_encoded.ok_or_else(|| {
                AdapterError::InvalidResponse("prediction carried no image bytes".into())
            })?;
            let bytes = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| AdapterError::InvalidResponse(format!("invalid base64 image: {e}")))?;
            Ok(GeneratedImage {
                bytes,
                mime_type: prediction.mime_type.unwrap_or_else(|| "image/png".into()),
            })
        })
        .collect()
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate(&self, prompt: &str, count: u32) -> AdapterResult<Vec<GeneratedImage>> {
        let body = json!({
            "instances": [{"prompt": prompt}],
            "parameters": {"sampleCount": count.max(1)},
        });
        with_retry(&self.retry, "imagen", || self.predict(&body))
            .instrument(adapter_call_span("imagen", "predict"))
            .await
    }
}
