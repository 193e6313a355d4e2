use adcampaign_core::{AdapterError, AdapterResult};
use reqwest::Response;

/// Turns a non-success response into an [`AdapterError`] carrying the body.
pub(crate) async fn check_response(response: Response) -> AdapterResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AdapterError::from_status(status.as_u16(), body))
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> AdapterError {
    if err.is_decode() {
        AdapterError::InvalidResponse(err.to_string())
    } else {
        AdapterError::Transport(err.to_string())
    }
}

/// Vertex AI project coordinates and credentials.
#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project: String,
    pub location: String,
    pub access_token: String,
    pub base_url: Option<String>,
}

impl VertexConfig {
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            location: location.into(),
            access_token: access_token.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }

    /// `…/v1/projects/{p}/locations/{l}/publishers/google/models/{model}:{method}`
    pub(crate) fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
            self.endpoint(),
            self.project,
            self.location,
            model,
            method
        )
    }
}
