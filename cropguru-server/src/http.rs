//! CropGuru HTTP REST API
//!
//! Axum router mounted under `/api`. Every route translates one request into
//! at most one store call and returns JSON.
//!
//! Endpoints:
//! - GET  /health               — liveness, never touches the store
//! - GET  /chat, POST /chat     — chat history (50) / post a message
//! - GET  /tasks, POST /tasks   — tasks (100) / create a task
//! - GET  /notifications        — notifications (100)
//! - GET  /predictions          — yield prediction requests (50)
//! - POST /predictions/yield    — request a yield prediction
//! - POST /irrigation           — schedule irrigation
//! - POST /alerts/weather       — set a weather alert
//! - POST /analyze/field        — start a satellite field analysis
//! - GET  /forecast?days=N      — placeholder rain forecast, not persisted
//! - POST /location             — upsert the farm location
//! - GET  /disease/history      — disease analyses (50)
//! - POST /disease/analyze      — placeholder disease analysis of an image

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use cropguru_core::{DocumentStore, RandomSource};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use crate::routes::*;

/// Request bodies above this are rejected with 413.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<dyn DocumentStore>,
    pub random: Arc<dyn RandomSource>,
    pub forecast_max_days: usize,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/chat", get(list_chat_handler).post(create_chat_handler))
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route("/notifications", get(list_notifications_handler))
        .route("/predictions", get(list_predictions_handler))
        .route("/predictions/yield", post(request_yield_handler))
        .route("/irrigation", post(schedule_irrigation_handler))
        .route("/alerts/weather", post(weather_alert_handler))
        .route("/analyze/field", post(analyze_field_handler))
        .route("/forecast", get(forecast_handler))
        .route("/location", post(set_location_handler))
        .route("/disease/history", get(disease_history_handler))
        .route("/disease/analyze", post(analyze_disease_handler));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    addr: &str,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API listening on http://{}/api", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal");
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
