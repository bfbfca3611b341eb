//! Join request review: the manager side of the membership workflow.

use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
};
use hearth_common::{
    error::{HearthError, HearthResult},
    models::join_request::{JoinRequest, JoinRequestStatus},
    permissions::Permissions,
    workflow::{ReviewAction, status_changed, transition},
};
use hearth_db::repository::join_requests;
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
        .route("/communities/{community_id}/join-requests", get(list_requests))
        .route(
            "/communities/{community_id}/join-requests/{request_id}/approve",
            put(approve_request),
        )
        .route(
            "/communities/{community_id}/join-requests/{request_id}/reject",
            put(reject_request),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<JoinRequestStatus>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/communities/{community_id}/join-requests
async fn list_requests(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<JoinRequest>> {
    let access = CommunityAccess::load(&state.db, &auth, community_id).await?;
    access.require(Permissions::REVIEW_JOIN_REQUESTS)?;

    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));
    let list =
        join_requests::list_for_community(&state.db.pool, community_id, query.status, limit, offset)
            .await?;
    reply("ok", list)
}

/// PUT /api/v1/communities/{community_id}/join-requests/{request_id}/approve
async fn approve_request(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((community_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<JoinRequest> {
    let request = review(&state, &auth, community_id, request_id, ReviewAction::Approve).await?;
    reply("Join request approved", request)
}

/// PUT /api/v1/communities/{community_id}/join-requests/{request_id}/reject
async fn reject_request(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((community_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<JoinRequest> {
    let request = review(&state, &auth, community_id, request_id, ReviewAction::Reject).await?;
    reply("Join request rejected", request)
}

async fn review(
    state: &AppState,
    auth: &AuthContext,
    community_id: Uuid,
    request_id: Uuid,
    action: ReviewAction,
) -> HearthResult<JoinRequest> {
    let access = CommunityAccess::load(&state.db, auth, community_id).await?;
    access.require(Permissions::REVIEW_JOIN_REQUESTS)?;

    let request = join_requests::find_by_id(&state.db.pool, request_id)
        .await?
        .filter(|r| r.community_id == community_id)
        .ok_or_else(|| HearthError::not_found("Join request"))?;

    let to = transition(request.status, action).inspect_err(|_| {
        tracing::warn!(
            request_id = %request_id,
            status = request.status.as_str(),
            action = action.as_str(),
            "Rejected join request transition"
        );
    })?;

    if !join_requests::resolve(&state.db.pool, &request, to, auth.user_id).await? {
        return Err(status_changed::<JoinRequestStatus>(action));
    }

    tracing::info!(
        request_id = %request_id,
        community_id = %community_id,
        reviewer = %auth.user_id,
        status = to.as_str(),
        "Join request resolved"
    );

    join_requests::find_by_id(&state.db.pool, request_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Join request"))
}
