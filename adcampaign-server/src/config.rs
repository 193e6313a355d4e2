use adcampaign_runner::Runner;
use std::{sync::Arc, time::Duration};

/// User id recorded on runs started over HTTP.
pub const DEFAULT_USER_ID: &str = "demo-user";

const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;
// A run polls video generation for several minutes per influencer.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Security configuration for the campaign server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
    /// Request timeout duration (default: 30 minutes)
    pub request_timeout: Duration,
    /// Whether failed runs report the underlying error text
    pub expose_error_details: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            expose_error_details: false,
        }
    }
}

impl SecurityConfig {
    /// Permissive CORS and detailed errors.
    pub fn development() -> Self {
        Self { expose_error_details: true, ..Self::default() }
    }

    /// Only the given origins may call the API.
    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub runner: Arc<Runner>,
    pub user_id: String,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self { runner, user_id: DEFAULT_USER_ID.to_string(), security: SecurityConfig::default() }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = timeout;
        self
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.security.expose_error_details = expose;
        self
    }
}
