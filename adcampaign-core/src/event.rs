use crate::Result;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use uuid::Uuid;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StageEvent>> + Send>>;

/// A human-readable progress record emitted by a stage.
///
/// Events are immutable once built; fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    id: String,
    timestamp: DateTime<Utc>,
    invocation_id: String,
    author: String,
    text: String,
}

impl StageEvent {
    pub fn new(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
