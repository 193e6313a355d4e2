use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Per-run key-value store shared by the stages of one campaign run.
///
/// Writes take `&self`: the store lives behind an `Arc<dyn StageContext>`
/// that every stage receives, and only one stage is live at a time.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn all(&self) -> HashMap<String, Value>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Read access to the state of one run, handed to every stage.
pub trait StageContext: Send + Sync {
    fn invocation_id(&self) -> &str;
    fn app_name(&self) -> &str;
    fn user_id(&self) -> &str;
    fn session_id(&self) -> &str;
    /// The raw text that started the run.
    fn user_content(&self) -> &str;
    fn store(&self) -> &dyn SessionStore;
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: HashMap<String, Value>) -> Self {
        Self { values: RwLock::new(values) }
    }
}

impl SessionStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values.write().unwrap_or_else(|e| e.into_inner()).insert(key.to_string(), value);
    }

    fn all(&self) -> HashMap<String, Value> {
        self.values.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
