//! Health check route

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::store::Database;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Health check route at `/health`
pub fn health_routes(db: Database) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(db)
}

/// 200 when the database answers, 503 otherwise
async fn health_handler(State(db): State<Database>) -> impl IntoResponse {
    let (status, database) = match db.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    let response = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    };

    (status, Json(response))
}
