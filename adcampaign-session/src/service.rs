use crate::{CampaignRun, Session};
use adcampaign_core::{Result, StageEvent};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub app_name: String,
    pub user_id: String,
    /// A fresh id is generated when `None`.
    pub session_id: Option<String>,
    pub state: HashMap<String, Value>,
}

#[async_trait]
pub trait SessionService: Send + Sync {
    /// Fails when `session_id` is already taken.
    async fn create(&self, req: CreateRequest) -> Result<Arc<dyn Session>>;
    async fn find(&self, session_id: &str) -> Result<Arc<dyn Session>>;
    async fn append_event(&self, run: &CampaignRun, event: StageEvent) -> Result<()>;
}
