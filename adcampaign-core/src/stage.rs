use crate::{EventStream, Result, StageContext};
use async_trait::async_trait;
use std::sync::Arc;

/// One pipeline unit.
///
/// A stage reads the keys it depends on from the context's session store,
/// writes the key(s) it owns, and reports progress through the returned
/// event stream. Missing dependencies must be reported as
/// [`CampaignError::MissingDependency`](crate::CampaignError::MissingDependency)
/// before any event is produced.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Session keys that must exist before this stage can run.
    fn required_keys(&self) -> &[&'static str] {
        &[]
    }

    /// Keys this stage writes.
    fn output_keys(&self) -> &[&'static str] {
        &[]
    }

    fn sub_stages(&self) -> &[Arc<dyn Stage>] {
        &[]
    }

    async fn execute(&self, ctx: Arc<dyn StageContext>) -> Result<EventStream>;
}
