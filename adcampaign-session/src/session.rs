use adcampaign_core::{SessionStore, StageEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignRun {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

impl CampaignRun {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// One run's session: its identity, key-value store and event log.
pub trait Session: Send + Sync {
    fn run(&self) -> &CampaignRun;
    fn store(&self) -> &dyn SessionStore;
    fn events(&self) -> Vec<StageEvent>;
    fn last_update_time(&self) -> DateTime<Utc>;

    fn id(&self) -> &str {
        &self.run().session_id
    }

    fn app_name(&self) -> &str {
        &self.run().app_name
    }

    fn user_id(&self) -> &str {
        &self.run().user_id
    }
}
