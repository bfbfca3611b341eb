//! Marketplace routes: listings, their moderation and sale.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
};
use hearth_common::{
    error::{HearthError, HearthResult},
    models::listing::{CreateListingRequest, Listing, ListingStatus, UpdateListingRequest},
    permissions::Permissions,
    id,
    validation::validate_request,
    workflow::{ListingAction, StatusMachine, edit_refused, status_changed, transition},
};
use hearth_db::repository::listings;
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
        .route("/marketplace", get(list_listings).post(create_listing))
        .route(
            "/marketplace/{listing_id}",
            get(get_listing).put(update_listing).delete(delete_listing),
        )
        .route("/marketplace/{listing_id}/approve", put(approve_listing))
        .route("/marketplace/{listing_id}/reject", put(reject_listing))
        .route("/marketplace/{listing_id}/sold", put(mark_sold))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    community_id: Uuid,
    status: Option<ListingStatus>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/marketplace?community_id=
async fn list_listings(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Listing>> {
    let access = CommunityAccess::load(&state.db, &auth, query.community_id).await?;
    access.require(Permissions::VIEW)?;

    let visible_to = (!access.can(Permissions::MODERATE_CONTENT)).then_some(auth.user_id);
    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));

    let list = listings::list_listings(
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

/// POST /api/v1/marketplace
async fn create_listing(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateListingRequest>,
) -> ApiResult<Listing> {
    validate_request(&body)?;

    let access = CommunityAccess::load(&state.db, &auth, body.community_id).await?;
    access.require(Permissions::LIST_ITEMS)?;

    let listing = listings::create_listing(
        &state.db.pool,
        id::generate_id(),
        body.community_id,
        auth.user_id,
        body.title.trim(),
        body.description.as_deref(),
        body.price,
    )
    .await?;

    tracing::info!(
        listing_id = %listing.id,
        community_id = %listing.community_id,
        seller = %auth.user_id,
        price = listing.price,
        "Listing submitted for review"
    );

    reply("Listing submitted for review", listing)
}

async fn load(
    state: &AppState,
    auth: &AuthContext,
    listing_id: Uuid,
) -> HearthResult<(Listing, CommunityAccess)> {
    let listing = listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Listing"))?;
    let access = CommunityAccess::load(&state.db, auth, listing.community_id).await?;
    access.require(Permissions::VIEW)?;
    Ok((listing, access))
}

/// GET /api/v1/marketplace/{listing_id}
async fn get_listing(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Listing> {
    let (listing, access) = load(&state, &auth, listing_id).await?;

    let visible = matches!(listing.status, ListingStatus::Approved | ListingStatus::Sold)
        || listing.user_id == auth.user_id
        || access.can(Permissions::MODERATE_CONTENT);
    if !visible {
        return Err(HearthError::not_found("Listing"));
    }
    reply("ok", listing)
}

/// PUT /api/v1/marketplace/{listing_id}
///
/// Seller only, and only while the listing waits for review.
async fn update_listing(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
    Json(body): Json<UpdateListingRequest>,
) -> ApiResult<Listing> {
    validate_request(&body)?;

    let (listing, access) = load(&state, &auth, listing_id).await?;
    if listing.user_id != auth.user_id {
        return Err(HearthError::Forbidden);
    }
    access.require(Permissions::LIST_ITEMS)?;

    if listing.status != ListingStatus::Pending {
        return Err(edit_refused(Some(listing.status)));
    }

    let edited = listings::update_listing(
        &state.db.pool,
        listing_id,
        body.title.as_deref().map(str::trim),
        body.description.as_deref(),
        body.price,
    )
    .await?;
    if !edited {
        return Err(edit_refused::<ListingStatus>(None));
    }
    let updated = listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Listing"))?;

    tracing::info!(listing_id = %listing_id, seller = %auth.user_id, "Listing edited");

    reply("Listing updated", updated)
}

/// DELETE /api/v1/marketplace/{listing_id}
async fn delete_listing(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Uuid> {
    let (listing, access) = load(&state, &auth, listing_id).await?;
    if listing.user_id != auth.user_id {
        access.require(Permissions::MODERATE_CONTENT)?;
    }

    listings::delete_listing(&state.db.pool, listing_id).await?;
    tracing::info!(listing_id = %listing_id, actor = %auth.user_id, "Listing deleted");

    reply("Listing deleted", listing_id)
}

/// PUT /api/v1/marketplace/{listing_id}/approve
async fn approve_listing(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Listing> {
    let listing = apply(&state, &auth, listing_id, ListingAction::Approve).await?;
    reply("Listing approved", listing)
}

/// PUT /api/v1/marketplace/{listing_id}/reject
async fn reject_listing(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Listing> {
    let listing = apply(&state, &auth, listing_id, ListingAction::Reject).await?;
    reply("Listing rejected", listing)
}

/// PUT /api/v1/marketplace/{listing_id}/sold
async fn mark_sold(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Listing> {
    let listing = apply(&state, &auth, listing_id, ListingAction::MarkSold).await?;
    reply("Listing marked as sold", listing)
}

/// Moderation is for managers; the seller may also mark their own item sold.
async fn apply(
    state: &AppState,
    auth: &AuthContext,
    listing_id: Uuid,
    action: ListingAction,
) -> HearthResult<Listing> {
    let (listing, access) = load(state, auth, listing_id).await?;
    let is_seller_sale = action == ListingAction::MarkSold && listing.user_id == auth.user_id;
    if !is_seller_sale {
        access.require(Permissions::MODERATE_CONTENT)?;
    }

    let to = transition(listing.status, action).inspect_err(|_| {
        tracing::warn!(
            listing_id = %listing_id,
            status = listing.status.as_str(),
            action = ListingStatus::action_name(action),
            "Rejected listing transition"
        );
    })?;
    if !listings::update_status(&state.db.pool, listing_id, listing.status, to).await? {
        return Err(status_changed::<ListingStatus>(action));
    }

    tracing::info!(
        listing_id = %listing_id,
        actor = %auth.user_id,
        status = to.as_str(),
        "Listing status changed"
    );

    listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Listing"))
}
