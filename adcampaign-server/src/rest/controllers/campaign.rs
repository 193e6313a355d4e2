use crate::ServerConfig;
use adcampaign_runner::RunStatus;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

const GENERIC_FAILURE: &str = "Campaign generation failed";

#[derive(Clone)]
pub struct CampaignController {
    config: ServerConfig,
}

impl CampaignController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    fn error_text(&self, detail: String) -> String {
        if self.config.security.expose_error_details { detail } else { GENERIC_FAILURE.to_string() }
    }
}

#[derive(Serialize, Deserialize)]
pub struct CampaignRequest {
    pub description: String,
}

#[derive(Serialize, Deserialize)]
pub struct CampaignResponse {
    pub output: String,
    pub session_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct CampaignErrorResponse {
    pub error: String,
    pub failed_stage: Option<String>,
    pub output: String,
}

/// Runs the whole pipeline for one product description.
///
/// A failed run still answers with the text produced before the failure.
pub async fn generate_campaign(
    State(controller): State<CampaignController>,
    Json(req): Json<CampaignRequest>,
) -> Response {
    let config = &controller.config;
    let outcome =
        match config.runner.run_to_completion(config.user_id.clone(), None, req.description).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "campaign run could not start");
                let body = CampaignErrorResponse {
                    error: controller.error_text(e.to_string()),
                    failed_stage: None,
                    output: String::new(),
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

    let output = outcome.output();
    match outcome.status {
        RunStatus::Done => {
            let body = CampaignResponse { output, session_id: outcome.run.session_id };
            (StatusCode::OK, Json(body)).into_response()
        }
        RunStatus::Failed { stage, error } => {
            tracing::warn!(session.id = %outcome.run.session_id, stage = stage.as_deref(), "campaign run failed");
            let body =
                CampaignErrorResponse { error: controller.error_text(error), failed_stage: stage, output };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
