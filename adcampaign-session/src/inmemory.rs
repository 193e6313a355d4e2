use crate::{CampaignRun, CreateRequest, Session, SessionService};
use adcampaign_core::{CampaignError, InMemoryStore, Result, SessionStore, StageEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub const DEFAULT_MAX_SESSIONS: usize = 100;

struct InMemorySession {
    run: CampaignRun,
    store: InMemoryStore,
    events: RwLock<Vec<StageEvent>>,
    updated_at: RwLock<DateTime<Utc>>,
}

impl InMemorySession {
    fn push(&self, event: StageEvent) {
        let timestamp = event.timestamp();
        self.events.write().unwrap_or_else(|e| e.into_inner()).push(event);
        *self.updated_at.write().unwrap_or_else(|e| e.into_inner()) = timestamp;
    }
}

impl Session for InMemorySession {
    fn run(&self) -> &CampaignRun {
        &self.run
    }

    fn store(&self) -> &dyn SessionStore {
        &self.store
    }

    fn events(&self) -> Vec<StageEvent> {
        self.events.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn last_update_time(&self) -> DateTime<Utc> {
        *self.updated_at.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Keeps recent runs' sessions in process memory, keyed by session id.
///
/// Each created session owns a fresh store, so nothing written during one
/// run is visible to another. At most `max_sessions` are retained: creating
/// one more evicts the least recently updated session nobody else holds.
/// Sessions of runs still in flight are never evicted.
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<String, Arc<InMemorySession>>>,
    max_sessions: usize,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self { sessions: RwLock::new(HashMap::new()), max_sessions: DEFAULT_MAX_SESSIONS }
    }

    #[must_use]
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Number of sessions currently held.
    pub fn retained(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    fn lookup(&self, session_id: &str) -> Result<Arc<InMemorySession>> {
        self.sessions
            .read()
            .map_err(|_| CampaignError::Session("session map lock poisoned".into()))?
            .get(session_id)
            .cloned()
            .ok_or_else(|| CampaignError::Session(format!("session '{session_id}' not found")))
    }
}

/// Drops idle sessions, oldest update first, until there is room for one more.
fn evict_idle(sessions: &mut HashMap<String, Arc<InMemorySession>>, max_sessions: usize) {
    while sessions.len() >= max_sessions {
        let oldest = sessions
            .iter()
            .filter(|(_, session)| Arc::strong_count(session) == 1)
            .min_by_key(|(_, session)| session.last_update_time())
            .map(|(id, _)| id.clone());
        let Some(id) = oldest else {
            tracing::warn!(retained = sessions.len(), max_sessions, "all sessions busy; retaining over limit");
            return;
        };
        sessions.remove(&id);
        tracing::debug!(session.id = %id, "idle session evicted");
    }
}

impl Default for InMemorySessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create(&self, req: CreateRequest) -> Result<Arc<dyn Session>> {
        let session_id = req.session_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| CampaignError::Session("session map lock poisoned".into()))?;
        if sessions.contains_key(&session_id) {
            return Err(CampaignError::Session(format!("session '{session_id}' already exists")));
        }
        evict_idle(&mut sessions, self.max_sessions);

        let run = CampaignRun::new(req.app_name, req.user_id, session_id.clone());
        let session = Arc::new(InMemorySession {
            updated_at: RwLock::new(run.created_at),
            run,
            store: InMemoryStore::with_values(req.state),
            events: RwLock::new(Vec::new()),
        });
        sessions.insert(session_id, session.clone());
        tracing::debug!(session.id = %session.run.session_id, retained = sessions.len(), "session created");

        Ok(session)
    }

    async fn find(&self, session_id: &str) -> Result<Arc<dyn Session>> {
        let session = self.lookup(session_id)?;
        Ok(session)
    }

    async fn append_event(&self, run: &CampaignRun, event: StageEvent) -> Result<()> {
        self.lookup(&run.session_id)?.push(event);
        Ok(())
    }
}
