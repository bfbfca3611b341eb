//! Health check endpoint for load balancers and container probes.

use axum::{Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    AppState,
    response::{ApiResult, reply},
};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
    version: &'static str,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    let db_ok = state.db.health_check().await;

    reply(
        "ok",
        HealthResponse {
            status: if db_ok { "healthy" } else { "degraded" },
            database: db_ok,
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}
