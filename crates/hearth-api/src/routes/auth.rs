//! Authentication routes: register and login.

use axum::{Json, Router, extract::State, routing::post};
use hearth_common::{
    error::HearthError,
    models::user::{LoginRequest, PlatformRole, RegisterRequest, UserResponse},
    id,
    validation::{validate_name, validate_request},
};
use hearth_db::repository::users;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    AppState,
    auth::{self, TokenPair},
    response::{ApiResult, reply},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Serialize)]
pub struct AuthResponse {
    user: UserResponse,
    #[serde(flatten)]
    tokens: TokenPair,
}

/// POST /api/v1/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    validate_request(&body)?;
    validate_name(&body.name)?;

    if users::find_by_email(&state.db.pool, &body.email)
        .await?
        .is_some()
    {
        return Err(HearthError::AlreadyExists {
            resource: "Email".into(),
        });
    }

    let password_hash = auth::hash_password(&body.password)
        .map_err(|e| HearthError::Internal(anyhow::anyhow!("{e}")))?;

    let user = users::create_user(
        &state.db.pool,
        id::generate_id(),
        body.name.trim(),
        &body.email,
        &password_hash,
        PlatformRole::Resident,
    )
    .await?;

    let tokens = auth::generate_token_pair(&user, &state.auth)
        .map_err(|e| HearthError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "New user registered");

    reply(
        "Account created",
        AuthResponse {
            user: user.into(),
            tokens,
        },
    )
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let user = users::find_by_email(&state.db.pool, &body.email)
        .await?
        .ok_or(HearthError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &user.password_hash)
        .map_err(|_| HearthError::InvalidCredentials)?;
    if !valid {
        return Err(HearthError::InvalidCredentials);
    }

    let tokens = auth::generate_token_pair(&user, &state.auth)
        .map_err(|e| HearthError::Internal(e.into()))?;

    tracing::debug!(user_id = %user.id, "User logged in");

    reply(
        "Logged in",
        AuthResponse {
            user: user.into(),
            tokens,
        },
    )
}
