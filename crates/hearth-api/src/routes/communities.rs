//! Community routes: directory, administration, join and leave.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
};
use hearth_common::{
    error::HearthError,
    models::{
        community::{
            Community, CommunityStatus, CreateCommunityRequest, SetCommunityStatusRequest,
            UpdateCommunityRequest,
        },
        join_request::{CreateJoinRequest, JoinRequest},
    },
    permissions::Permissions,
    id,
    validation::{validate_name, validate_request},
};
use hearth_db::repository::{communities, join_requests, members};
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
        .route("/communities", get(list_communities).post(create_community))
        .route(
            "/communities/{community_id}",
            get(get_community)
                .put(update_community)
                .delete(delete_community),
        )
        .route("/communities/{community_id}/status", put(set_status))
        .route("/communities/{community_id}/join", post(join_community))
        .route("/communities/{community_id}/leave", post(leave_community))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<CommunityStatus>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/communities
async fn list_communities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Community>> {
    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));
    let list = communities::list_communities(&state.db.pool, query.status, limit, offset).await?;
    reply("ok", list)
}

/// POST /api/v1/communities
///
/// Admin-created communities open immediately; anyone else's wait for an
/// admin to activate them. The creator becomes the first manager.
async fn create_community(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCommunityRequest>,
) -> ApiResult<Community> {
    validate_request(&body)?;
    validate_name(&body.name)?;

    let max = state.limits.max_communities_per_user;
    if !auth.is_admin()
        && communities::count_created_by(&state.db.pool, auth.user_id).await? >= i64::from(max)
    {
        return Err(HearthError::LimitReached {
            message: format!("You can create at most {max} communities"),
        });
    }

    let status = if auth.is_admin() {
        CommunityStatus::Active
    } else {
        CommunityStatus::Pending
    };

    let community = communities::create_community(
        &state.db.pool,
        id::generate_id(),
        body.name.trim(),
        body.description.as_deref(),
        status,
        auth.user_id,
    )
    .await?;

    tracing::info!(
        community_id = %community.id,
        creator = %auth.user_id,
        status = community.status.as_str(),
        "Community created"
    );

    reply("Community created", community)
}

/// GET /api/v1/communities/{community_id}
async fn get_community(
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
) -> ApiResult<Community> {
    let community = communities::find_by_id(&state.db.pool, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Community"))?;
    reply("ok", community)
}

/// PUT /api/v1/communities/{community_id}
async fn update_community(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
    Json(body): Json<UpdateCommunityRequest>,
) -> ApiResult<Community> {
    validate_request(&body)?;
    if let Some(name) = &body.name {
        validate_name(name)?;
    }

    let access = CommunityAccess::load(&state.db, &auth, community_id).await?;
    access.require(Permissions::MANAGE_COMMUNITY)?;

    let updated = communities::update_community(
        &state.db.pool,
        community_id,
        body.name.as_deref().map(str::trim),
        body.description.as_deref(),
    )
    .await?
    .ok_or_else(|| HearthError::not_found("Community"))?;

    reply("Community updated", updated)
}

/// PUT /api/v1/communities/{community_id}/status
async fn set_status(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
    Json(body): Json<SetCommunityStatusRequest>,
) -> ApiResult<Community> {
    if !auth.is_admin() {
        return Err(HearthError::Forbidden);
    }

    if !communities::set_status(&state.db.pool, community_id, body.status).await? {
        return Err(HearthError::not_found("Community"));
    }
    let community = communities::find_by_id(&state.db.pool, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Community"))?;

    tracing::info!(
        community_id = %community_id,
        admin = %auth.user_id,
        status = body.status.as_str(),
        "Community status changed"
    );

    reply("Community status updated", community)
}

/// DELETE /api/v1/communities/{community_id}
async fn delete_community(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
) -> ApiResult<Uuid> {
    if !auth.is_admin() {
        return Err(HearthError::Forbidden);
    }

    if !communities::delete_community(&state.db.pool, community_id).await? {
        return Err(HearthError::not_found("Community"));
    }

    tracing::info!(community_id = %community_id, admin = %auth.user_id, "Community deleted");

    reply("Community deleted", community_id)
}

/// POST /api/v1/communities/{community_id}/join
///
/// Opens a pending join request. The body (`{ "message": ... }`) is optional.
async fn join_community(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
    body: Option<Json<CreateJoinRequest>>,
) -> ApiResult<JoinRequest> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    validate_request(&body)?;

    let access = CommunityAccess::load(&state.db, &auth, community_id).await?;
    if access.community.status != CommunityStatus::Active {
        return Err(HearthError::Validation {
            message: "Community is not accepting members".into(),
        });
    }
    if access.member.is_some() {
        return Err(HearthError::AlreadyExists {
            resource: "Membership".into(),
        });
    }
    if join_requests::find_pending(&state.db.pool, auth.user_id, community_id)
        .await?
        .is_some()
    {
        return Err(HearthError::AlreadyExists {
            resource: "Join request".into(),
        });
    }

    let request = join_requests::create_request(
        &state.db.pool,
        id::generate_id(),
        auth.user_id,
        community_id,
        body.message.as_deref(),
    )
    .await
    .map_err(|e| match e {
        // Lost a race against a concurrent request from the same user
        sqlx::Error::Database(ref db) if db.is_unique_violation() => HearthError::AlreadyExists {
            resource: "Join request".into(),
        },
        other => other.into(),
    })?;

    tracing::info!(
        request_id = %request.id,
        community_id = %community_id,
        user_id = %auth.user_id,
        "Join request opened"
    );

    reply("Join request submitted", request)
}

/// POST /api/v1/communities/{community_id}/leave
///
/// Blocked members stay on record until a manager unblocks them.
async fn leave_community(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<Uuid>,
) -> ApiResult<Uuid> {
    let member = members::find_member(&state.db.pool, auth.user_id, community_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Membership"))?;

    if member.is_blocked() {
        return Err(HearthError::MemberBlocked);
    }
    if member.is_manager() && members::count_managers(&state.db.pool, community_id).await? <= 1 {
        return Err(HearthError::Validation {
            message: "The last manager cannot leave the community".into(),
        });
    }

    members::remove_member(&state.db.pool, auth.user_id, community_id).await?;

    tracing::info!(community_id = %community_id, user_id = %auth.user_id, "Member left");

    reply("Left community", community_id)
}
