use adcampaign_core::StageEvent;
use adcampaign_session::SessionService;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionController {
    session_service: Arc<dyn SessionService>,
}

impl SessionController {
    pub fn new(session_service: Arc<dyn SessionService>) -> Self {
        Self { session_service }
    }
}

#[derive(Serialize)]
pub struct CampaignRecord {
    pub session_id: String,
    pub app_name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    pub state: HashMap<String, Value>,
    pub events: Vec<StageEvent>,
}

pub async fn get_campaign(
    State(controller): State<SessionController>,
    Path(session_id): Path<String>,
) -> Result<Json<CampaignRecord>, StatusCode> {
    let session =
        controller.session_service.find(&session_id).await.map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Json(CampaignRecord {
        session_id: session.id().to_string(),
        app_name: session.app_name().to_string(),
        user_id: session.user_id().to_string(),
        created_at: session.run().created_at,
        last_update_time: session.last_update_time(),
        state: session.store().all(),
        events: session.events(),
    }))
}
