//! # hearth-api
//!
//! REST API layer for Hearth. Every route lives under `/api/v1` and answers
//! with the `{ "message", "result" }` envelope.

pub mod access;
pub mod auth;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use hearth_common::config::{AppConfig, AuthConfig, LimitsConfig};
use hearth_db::Database;
use std::sync::Arc;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// JWT secret and token lifetimes.
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            db,
            auth: config.auth.clone(),
            limits: config.limits.clone(),
        }
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::health::router())
        .merge(routes::users::router(state.clone()))
        .merge(routes::communities::router(state.clone()))
        .merge(routes::join_requests::router(state.clone()))
        .merge(routes::directory::router(state.clone()))
        .merge(routes::pulses::router(state.clone()))
        .merge(routes::marketplace::router(state.clone()))
        .merge(routes::events::router(state.clone()))
        .merge(routes::sos::router(state.clone()));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(state)
}
