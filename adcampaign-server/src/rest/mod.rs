pub mod controllers;

pub use controllers::{CampaignController, SessionController};

use crate::ServerConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.security.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Builds the router with every route and middleware layer.
pub fn create_app(config: ServerConfig) -> Router {
    let campaign_controller = CampaignController::new(config.clone());
    let session_controller = SessionController::new(config.runner.session_service().clone());

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/generate_campaign", post(controllers::campaign::generate_campaign))
        .with_state(campaign_controller)
        .route("/campaigns/{session_id}", get(controllers::session::get_campaign))
        .with_state(session_controller);

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.security.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(build_cors_layer(&config))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            )),
    )
}

/// Binds `0.0.0.0:{port}` and serves until Ctrl+C.
pub async fn serve(config: ServerConfig, port: u16) -> anyhow::Result<()> {
    if config.security.allowed_origins.is_empty() {
        tracing::warn!("CORS allows any origin; configure allowed origins for production");
    }
    let app = create_app(config);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "campaign server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health_check() -> &'static str {
    "OK"
}
