//! Rutas HTTP
//!
//! Solo la superficie que necesita el motor: ingesta de posiciones,
//! el canal WebSocket de alertas y un health check.

pub mod alert_routes;
pub mod location_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Crear el router principal de la aplicación
pub fn create_router(state: AppState) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(&state.config.cors_origins)
    };

    Router::new()
        .route("/health", get(health))
        .nest("/vehicles", location_routes::create_location_router())
        .nest("/ws", alert_routes::create_alert_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let subscribers = state.hub.subscriber_count().await?;
    Ok(Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "subscribers": subscribers,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
