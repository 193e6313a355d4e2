use adcampaign_core::{SessionStore, StageContext};
use adcampaign_session::Session;
use std::sync::Arc;

/// The [`StageContext`] handed to every stage of one run.
///
/// Identity comes from the run's session; the store is the session's own, so
/// writes from one run are invisible to every other.
pub struct RunContext {
    invocation_id: String,
    user_content: String,
    session: Arc<dyn Session>,
}

impl RunContext {
    pub fn new(
        invocation_id: impl Into<String>,
        user_content: impl Into<String>,
        session: Arc<dyn Session>,
    ) -> Self {
        Self { invocation_id: invocation_id.into(), user_content: user_content.into(), session }
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }
}

impl StageContext for RunContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn app_name(&self) -> &str {
        self.session.app_name()
    }

    fn user_id(&self) -> &str {
        self.session.user_id()
    }

    fn session_id(&self) -> &str {
        self.session.id()
    }

    fn user_content(&self) -> &str {
        &self.user_content
    }

    fn store(&self) -> &dyn SessionStore {
        self.session.store()
    }
}
