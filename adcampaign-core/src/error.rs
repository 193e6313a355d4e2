use std::time::Duration;

/// Fatal errors. Returning one of these from a stage aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("Stage '{stage}' is missing required dependency '{key}'")]
    MissingDependency { stage: String, key: String },

    #[error("Stage '{stage}' could not parse upstream output: {message}")]
    UpstreamParse { stage: String, message: String },

    #[error("Stage '{stage}' adapter failure: {source}")]
    Adapter {
        stage: String,
        #[source]
        source: AdapterError,
    },

    #[error("Session key '{key}' holds malformed data: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stage '{stage}' failed: {source}")]
    Failed {
        stage: String,
        #[source]
        source: Box<CampaignError>,
    },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stage error: {0}")]
    Stage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CampaignError {
    pub fn missing_dependency(stage: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingDependency { stage: stage.into(), key: key.into() }
    }

    pub fn adapter(stage: impl Into<String>, source: AdapterError) -> Self {
        Self::Adapter { stage: stage.into(), source }
    }

    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }

    /// Name of the stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { stage, .. }
            | Self::UpstreamParse { stage, .. }
            | Self::Adapter { stage, .. }
            | Self::Failed { stage, .. } => Some(stage.as_str()),
            _ => None,
        }
    }

    /// Attributes the error to `stage` unless it already names one.
    pub fn in_stage(self, stage: &str) -> Self {
        if self.stage().is_some() {
            self
        } else {
            Self::Failed { stage: stage.to_string(), source: Box::new(self) }
        }
    }
}

pub type Result<T> = std::result::Result<T, CampaignError>;

/// Recoverable failures reported by external service adapters.
///
/// Stages absorb these (log and take a fallback path) and only lift them into
/// [`CampaignError::Adapter`] when no fallback exists.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Rate limited by upstream service")]
    RateLimited,

    #[error("Timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Adapter unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    pub fn from_status(code: u16, body: impl Into<String>) -> Self {
        match code {
            429 => Self::RateLimited,
            404 => Self::NotFound(body.into()),
            _ => Self::Status { code, body: body.into() },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { code, .. } => matches!(code, 408 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CampaignError::missing_dependency("social_metrics_agent", "product_info");
        assert_eq!(
            err.to_string(),
            "Stage 'social_metrics_agent' is missing required dependency 'product_info'"
        );
        assert!(err.is_missing_dependency());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CampaignError = io_err.into();
        assert!(matches!(err, CampaignError::Io(_)));
    }

    #[test]
    fn test_in_stage_keeps_existing_attribution() {
        let err = CampaignError::missing_dependency("ad_content_generator", "influencers")
            .in_stage("AdCampaignPipeline");
        assert_eq!(err.stage(), Some("ad_content_generator"));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "influencers.json");
        let err = CampaignError::from(io).in_stage("influencer_discovery_agent");
        assert_eq!(err.stage(), Some("influencer_discovery_agent"));
        assert!(err.to_string().contains("influencers.json"));
    }

    #[test]
    fn test_adapter_error_wraps_into_fatal() {
        let err = CampaignError::adapter("product_info_agent", AdapterError::RateLimited);
        assert!(matches!(err, CampaignError::Adapter { .. }));
        assert!(err.to_string().contains("Rate limited"));
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(AdapterError::from_status(429, ""), AdapterError::RateLimited));
        assert!(matches!(AdapterError::from_status(404, "gone"), AdapterError::NotFound(_)));
        assert!(matches!(
            AdapterError::from_status(500, "boom"),
            AdapterError::Status { code: 500, .. }
        ));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(AdapterError::RateLimited.is_retryable());
        assert!(AdapterError::from_status(503, "").is_retryable());
        assert!(!AdapterError::from_status(400, "").is_retryable());
        assert!(!AdapterError::InvalidResponse("bad".into()).is_retryable());
    }
}
