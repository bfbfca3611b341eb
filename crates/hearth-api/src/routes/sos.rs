//! SOS alert routes.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, patch},
};
use hearth_common::{
    error::{HearthError, HearthResult},
    models::sos::{CreateSosRequest, SosAlert, SosStatus, UpdateSosRequest},
    permissions::Permissions,
    id,
    validation::validate_request,
    workflow::{SosAction, status_changed, transition},
};
use hearth_db::repository::sos;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    AppState,
    access::CommunityAccess,
    middleware::AuthContext,
    response::{ApiResult, reply},
};

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/sos", get(list_alerts).post(raise_alert))
        .route("/sos/{alert_id}", patch(update_alert).delete(delete_alert))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    community_id: Uuid,
    status: Option<SosStatus>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/sos?community_id=
async fn list_alerts(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<SosAlert>> {
    let access = CommunityAccess::load(&state.db, &auth, query.community_id).await?;
    access.require(Permissions::MODERATE_CONTENT)?;

    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));
    let list =
        sos::list_alerts(&state.db.pool, query.community_id, query.status, limit, offset).await?;
    reply("ok", list)
}

/// POST /api/v1/sos
///
/// Blocked members keep this right.
async fn raise_alert(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSosRequest>,
) -> ApiResult<SosAlert> {
    validate_request(&body)?;

    let access = CommunityAccess::load(&state.db, &auth, body.community_id).await?;
    access.require(Permissions::RAISE_SOS)?;

    let alert = sos::create_alert(
        &state.db.pool,
        id::generate_id(),
        body.community_id,
        auth.user_id,
        &body.message,
        body.location.as_deref(),
    )
    .await?;

    tracing::warn!(
        alert_id = %alert.id,
        community_id = %alert.community_id,
        user_id = %auth.user_id,
        "SOS alert raised"
    );

    reply("SOS alert raised", alert)
}

async fn load(
    state: &AppState,
    auth: &AuthContext,
    alert_id: Uuid,
) -> HearthResult<(SosAlert, CommunityAccess)> {
    let alert = sos::find_by_id(&state.db.pool, alert_id)
        .await?
        .ok_or_else(|| HearthError::not_found("SOS alert"))?;
    let access = CommunityAccess::load(&state.db, auth, alert.community_id).await?;
    Ok((alert, access))
}

/// PATCH /api/v1/sos/{alert_id}
///
/// The body names the target status; `open` is never a target.
async fn update_alert(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<Uuid>,
    Json(body): Json<UpdateSosRequest>,
) -> ApiResult<SosAlert> {
    let action = match body.status {
        SosStatus::Acknowledged => SosAction::Acknowledge,
        SosStatus::Resolved => SosAction::Resolve,
        SosStatus::Open => {
            return Err(HearthError::Validation {
                message: "An alert cannot be reopened".into(),
            });
        }
    };

    let (alert, access) = load(&state, &auth, alert_id).await?;
    access.require(Permissions::MODERATE_CONTENT)?;

    let to = transition(alert.status, action)?;
    if !sos::update_status(&state.db.pool, alert_id, alert.status, to).await? {
        return Err(status_changed::<SosStatus>(action));
    }

    tracing::info!(
        alert_id = %alert_id,
        actor = %auth.user_id,
        status = to.as_str(),
        "SOS alert updated"
    );

    let updated = sos::find_by_id(&state.db.pool, alert_id)
        .await?
        .ok_or_else(|| HearthError::not_found("SOS alert"))?;
    reply("SOS alert updated", updated)
}

/// DELETE /api/v1/sos/{alert_id}
async fn delete_alert(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<Uuid>,
) -> ApiResult<Uuid> {
    let (alert, access) = load(&state, &auth, alert_id).await?;
    if alert.user_id != auth.user_id {
        access.require(Permissions::MODERATE_CONTENT)?;
    }

    sos::delete_alert(&state.db.pool, alert_id).await?;
    tracing::info!(alert_id = %alert_id, actor = %auth.user_id, "SOS alert deleted");

    reply("SOS alert deleted", alert_id)
}
