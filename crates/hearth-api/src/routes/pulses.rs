//! Pulse routes: community posts and their moderation queue.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
};
use hearth_common::{
    error::{HearthError, HearthResult},
    models::pulse::{CreatePulseRequest, Pulse, PulseStatus, UpdatePulseRequest},
    permissions::Permissions,
    id,
    validation::validate_request,
    workflow::{ReviewAction, edit_refused, status_changed, transition},
};
use hearth_db::repository::pulses;
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
        .route("/pulses", get(list_pulses).post(create_pulse))
        .route(
            "/pulses/{pulse_id}",
            get(get_pulse).put(update_pulse).delete(delete_pulse),
        )
        .route("/pulses/{pulse_id}/approve", put(approve_pulse))
        .route("/pulses/{pulse_id}/reject", put(reject_pulse))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    community_id: Uuid,
    status: Option<PulseStatus>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/pulses?community_id=
///
/// Moderators see every pulse; residents see approved ones and their own.
async fn list_pulses(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Pulse>> {
    let access = CommunityAccess::load(&state.db, &auth, query.community_id).await?;
    access.require(Permissions::VIEW)?;

    let visible_to = (!access.can(Permissions::MODERATE_CONTENT)).then_some(auth.user_id);
    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));

    let list = pulses::list_pulses(
        &state.db.pool,
        query.community_id,
        query.status,
        visible_to,
        limit,
        offset,
    )
    .await?;
    reply("ok", list)
}

fn check_length(state: &AppState, content: &str) -> HearthResult<()> {
    let max = state.limits.max_pulse_length as usize;
    if content.chars().count() > max {
        return Err(HearthError::Validation {
            message: format!("Pulse content must be at most {max} characters"),
        });
    }
    Ok(())
}

/// POST /api/v1/pulses
async fn create_pulse(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePulseRequest>,
) -> ApiResult<Pulse> {
    validate_request(&body)?;
    check_length(&state, &body.content)?;

    let access = CommunityAccess::load(&state.db, &auth, body.community_id).await?;
    access.require(Permissions::POST_PULSES)?;

    let pulse = pulses::create_pulse(
        &state.db.pool,
        id::generate_id(),
        body.community_id,
        auth.user_id,
        &body.content,
    )
    .await?;

    tracing::info!(
        pulse_id = %pulse.id,
        community_id = %pulse.community_id,
        author = %auth.user_id,
        "Pulse submitted for review"
    );

    reply("Pulse submitted for review", pulse)
}

/// Load a pulse with the caller's access to its community.
async fn load(
    state: &AppState,
    auth: &AuthContext,
    pulse_id: Uuid,
) -> HearthResult<(Pulse, CommunityAccess)> {
    let pulse = pulses::find_by_id(&state.db.pool, pulse_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Pulse"))?;
    let access = CommunityAccess::load(&state.db, auth, pulse.community_id).await?;
    access.require(Permissions::VIEW)?;
    Ok((pulse, access))
}

/// GET /api/v1/pulses/{pulse_id}
async fn get_pulse(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(pulse_id): Path<Uuid>,
) -> ApiResult<Pulse> {
    let (pulse, access) = load(&state, &auth, pulse_id).await?;

    let visible = pulse.status == PulseStatus::Approved
        || pulse.user_id == auth.user_id
        || access.can(Permissions::MODERATE_CONTENT);
    if !visible {
        return Err(HearthError::not_found("Pulse"));
    }
    reply("ok", pulse)
}

/// PUT /api/v1/pulses/{pulse_id}
///
/// Only the author edits, and only while the pulse waits for review.
async fn update_pulse(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(pulse_id): Path<Uuid>,
    Json(body): Json<UpdatePulseRequest>,
) -> ApiResult<Pulse> {
    validate_request(&body)?;
    check_length(&state, &body.content)?;

    let (pulse, access) = load(&state, &auth, pulse_id).await?;
    if pulse.user_id != auth.user_id {
        return Err(HearthError::Forbidden);
    }
    access.require(Permissions::POST_PULSES)?;

    if pulse.status != PulseStatus::Pending {
        return Err(edit_refused(Some(pulse.status)));
    }

    if !pulses::update_content(&state.db.pool, pulse_id, &body.content).await? {
        return Err(edit_refused::<PulseStatus>(None));
    }
    let updated = pulses::find_by_id(&state.db.pool, pulse_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Pulse"))?;

    tracing::info!(pulse_id = %pulse_id, author = %auth.user_id, "Pulse edited");

    reply("Pulse updated", updated)
}

/// DELETE /api/v1/pulses/{pulse_id}
async fn delete_pulse(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(pulse_id): Path<Uuid>,
) -> ApiResult<Uuid> {
    let (pulse, access) = load(&state, &auth, pulse_id).await?;
    if pulse.user_id != auth.user_id {
        access.require(Permissions::MODERATE_CONTENT)?;
    }

    pulses::delete_pulse(&state.db.pool, pulse_id).await?;
    tracing::info!(pulse_id = %pulse_id, actor = %auth.user_id, "Pulse deleted");

    reply("Pulse deleted", pulse_id)
}

/// PUT /api/v1/pulses/{pulse_id}/approve
async fn approve_pulse(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(pulse_id): Path<Uuid>,
) -> ApiResult<Pulse> {
    let pulse = review(&state, &auth, pulse_id, ReviewAction::Approve).await?;
    reply("Pulse approved", pulse)
}

/// PUT /api/v1/pulses/{pulse_id}/reject
async fn reject_pulse(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(pulse_id): Path<Uuid>,
) -> ApiResult<Pulse> {
    let pulse = review(&state, &auth, pulse_id, ReviewAction::Reject).await?;
    reply("Pulse rejected", pulse)
}

async fn review(
    state: &AppState,
    auth: &AuthContext,
    pulse_id: Uuid,
    action: ReviewAction,
) -> HearthResult<Pulse> {
    let (pulse, access) = load(state, auth, pulse_id).await?;
    access.require(Permissions::MODERATE_CONTENT)?;

    let to = transition(pulse.status, action)?;
    if !pulses::update_status(&state.db.pool, pulse_id, pulse.status, to).await? {
        return Err(status_changed::<PulseStatus>(action));
    }

    tracing::info!(
        pulse_id = %pulse_id,
        reviewer = %auth.user_id,
        status = to.as_str(),
        "Pulse reviewed"
    );

    pulses::find_by_id(&state.db.pool, pulse_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Pulse"))
}
