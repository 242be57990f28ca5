/// Root and health check endpoints
///
/// # Endpoints
///
/// - `GET /` - Welcome message
/// - `GET /health` - Service health including database connectivity

use crate::{app::AppState, error::ApiResult, routes::Message};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Welcome message handler
///
/// ```text
/// GET /
/// ```
///
/// Response: `{"message": "Welcome to the Taskdeck API"}`
pub async fn read_root() -> Json<Message> {
    Json(Message::new("Welcome to the Taskdeck API"))
}

/// Health check handler
///
/// Returns service health status including database connectivity.
///
/// ```text
/// GET /health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
