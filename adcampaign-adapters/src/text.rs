//! Text generation against the Gemini `generateContent` REST endpoint.

use crate::http::{check_response, transport_error};
use crate::retry::{RetryPolicy, with_retry};
use adcampaign_core::{AdapterError, AdapterResult};
use adcampaign_telemetry::{Instrument, adapter_call_span};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Produces free-form text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, prompt: &str) -> AdapterResult<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

/// Gemini model reached with an API key.
///
/// ```rust,ignore
/// use adcampaign_adapters::GeminiTextModel;
///
/// let model = GeminiTextModel::new(std::env::var("GOOGLE_API_KEY")?, "gemini-2.0-flash")?;
/// let copy = model.generate("Write a tagline for EcoBottle").await?;
/// ```
pub struct GeminiTextModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GeminiTextModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> AdapterResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AdapterError::Unavailable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_once(&self, prompt: &str) -> AdapterResult<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent { role: "user", parts: vec![RequestPart { text: prompt }] }],
        };
        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_response(response).await?;
        let parsed: GenerateResponse = response.json().await.map_err(transport_error)?;
        parsed
            .into_text()
            .ok_or_else(|| AdapterError::InvalidResponse("response carried no candidates".into()))
    }
}

#[async_trait]
impl TextGenerator for GeminiTextModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> AdapterResult<String> {
        with_retry(&self.retry, "gemini", || self.generate_once(prompt))
        .instrument(adapter_call_span("gemini", "generate_content"))
        .await
    }
}
