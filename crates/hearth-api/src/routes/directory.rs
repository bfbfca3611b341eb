//! Member directory: listing, search, blocking and roles.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
};
use hearth_common::{
    error::{HearthError, HearthResult},
    models::member::{DirectoryEntry, Member, MemberRole, MemberStatus, SetMemberRoleRequest},
    permissions::Permissions,
    workflow::{BlockAction, status_changed, transition},
};
use hearth_db::repository::members;
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
        .route("/directory/{community_id}", get(list_members))
        .route("/directory/{community_id}/block/{user_id}", put(block_member))
        .route("/directory/{community_id}/unblock/{user_id}", put(unblock_member))
        .route("/directory/{community_id}/role/{user_id}", put(set_role))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct DirectoryQuery {
    /// Case-insensitive substring of name or email.
    search: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/directory/{community_id}
async fn list_members(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<Vec<DirectoryEntry>> {
    let access = CommunityAccess::load(&state.db, &auth, community_id).await?;
    access.require(Permissions::VIEW)?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));

    let entries =
        members::list_directory(&state.db.pool, community_id, search, limit, offset).await?;
    reply("ok", entries)
}

/// PUT /api/v1/directory/{community_id}/block/{user_id}
async fn block_member(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((community_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Member> {
    let member = apply_block(&state, &auth, community_id, user_id, BlockAction::Block).await?;
    reply("Member blocked", member)
}

/// PUT /api/v1/directory/{community_id}/unblock/{user_id}
async fn unblock_member(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((community_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Member> {
    let member = apply_block(&state, &auth, community_id, user_id, BlockAction::Unblock).await?;
    reply("Member unblocked", member)
}

async fn apply_block(
    state: &AppState,
    auth: &AuthContext,
    community_id: Uuid,
    user_id: Uuid,
    action: BlockAction,
) -> HearthResult<Member> {
    let access = CommunityAccess::load(&state.db, auth, community_id).await?;
    access.require(Permissions::MANAGE_MEMBERS)?;

    let target = members::find_member(&state.db.pool, user_id, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Member"))?;

    if action == BlockAction::Block && (user_id == auth.user_id || target.is_manager()) {
        tracing::warn!(
            community_id = %community_id,
            target = %user_id,
            actor = %auth.user_id,
            "Refused to block a manager or self"
        );
        return Err(HearthError::Forbidden);
    }

    let to = transition(target.status, action)?;
    if !members::update_status(&state.db.pool, user_id, community_id, target.status, to).await? {
        return Err(status_changed::<MemberStatus>(action));
    }

    tracing::info!(
        community_id = %community_id,
        target = %user_id,
        actor = %auth.user_id,
        status = to.as_str(),
        "Member status changed"
    );

    members::find_member(&state.db.pool, user_id, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Member"))
}

/// PUT /api/v1/directory/{community_id}/role/{user_id}
async fn set_role(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((community_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SetMemberRoleRequest>,
) -> ApiResult<Member> {
    let access = CommunityAccess::load(&state.db, &auth, community_id).await?;
    access.require(Permissions::MANAGE_MEMBERS)?;

    let target = members::find_member(&state.db.pool, user_id, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Member"))?;

    if body.role == MemberRole::Manager && target.is_blocked() {
        return Err(HearthError::Validation {
            message: "Unblock the member before promoting them".into(),
        });
    }
    if body.role == MemberRole::Member
        && target.is_manager()
        && members::count_managers(&state.db.pool, community_id).await? <= 1
    {
        return Err(HearthError::Validation {
            message: "A community needs at least one manager".into(),
        });
    }

    members::set_role(&state.db.pool, user_id, community_id, body.role).await?;

    tracing::info!(
        community_id = %community_id,
        target = %user_id,
        actor = %auth.user_id,
        role = body.role.as_str(),
        "Member role changed"
    );

    let updated = members::find_member(&state.db.pool, user_id, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Member"))?;
    reply("Member role updated", updated)
}
