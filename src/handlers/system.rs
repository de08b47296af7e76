//! Unauthenticated service endpoints: banner and liveness.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::config;
use crate::database::manager::DatabaseManager;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "edvirons-api",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": format!("{:?}", config::config().environment).to_lowercase(),
    }))
}

/// Liveness plus a database round trip. The process answers even when the
/// database is down, but reports degraded with a 503 so load balancers can
/// rotate it out.
pub async fn health() -> Response {
    match DatabaseManager::health_check().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "database": "reachable",
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unreachable",
                })),
            )
                .into_response()
        }
    }
}
