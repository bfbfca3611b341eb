//! Event routes: scheduling and registration.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use hearth_common::{
    error::{HearthError, HearthResult},
    models::event::{CreateEventRequest, Event, EventRegistration, UpdateEventRequest},
    permissions::Permissions,
    id,
    validation::validate_request,
};
use hearth_db::repository::events::{self, EventChanges, NewEvent, Registration};
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
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route(
            "/events/{event_id}/register",
            post(register).delete(unregister),
        )
        .route("/events/{event_id}/registrations", get(list_registrations))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    community_id: Uuid,
    limit: Option<u32>,
    offset: Option<u32>,
}

fn check_schedule(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> HearthResult<()> {
    if ends_at < starts_at {
        return Err(HearthError::Validation {
            message: "Event cannot end before it starts".into(),
        });
    }
    Ok(())
}

/// GET /api/v1/events?community_id=
async fn list_events(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Event>> {
    let access = CommunityAccess::load(&state.db, &auth, query.community_id).await?;
    access.require(Permissions::VIEW)?;

    let limit = state.limits.page_size(query.limit);
    let offset = i64::from(query.offset.unwrap_or(0));
    let list = events::list_events(&state.db.pool, query.community_id, limit, offset).await?;
    reply("ok", list)
}

/// POST /api/v1/events
async fn create_event(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateEventRequest>,
) -> ApiResult<Event> {
    validate_request(&body)?;
    check_schedule(body.starts_at, body.ends_at)?;

    let access = CommunityAccess::load(&state.db, &auth, body.community_id).await?;
    access.require(Permissions::MANAGE_EVENTS)?;

    let event = events::create_event(
        &state.db.pool,
        id::generate_id(),
        &NewEvent {
            community_id: body.community_id,
            title: body.title.trim(),
            description: body.description.as_deref(),
            location: body.location.as_deref(),
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            capacity: body.capacity,
            created_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(
        event_id = %event.id,
        community_id = %event.community_id,
        creator = %auth.user_id,
        "Event created"
    );

    reply("Event created", event)
}

async fn load(
    state: &AppState,
    auth: &AuthContext,
    event_id: Uuid,
) -> HearthResult<(Event, CommunityAccess)> {
    let event = events::find_by_id(&state.db.pool, event_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Event"))?;
    let access = CommunityAccess::load(&state.db, auth, event.community_id).await?;
    access.require(Permissions::VIEW)?;
    Ok((event, access))
}

/// GET /api/v1/events/{event_id}
async fn get_event(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Event> {
    let (event, _) = load(&state, &auth, event_id).await?;
    reply("ok", event)
}

/// PUT /api/v1/events/{event_id}
async fn update_event(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> ApiResult<Event> {
    validate_request(&body)?;

    let (event, access) = load(&state, &auth, event_id).await?;
    access.require(Permissions::MANAGE_EVENTS)?;

    check_schedule(
        body.starts_at.unwrap_or(event.starts_at),
        body.ends_at.unwrap_or(event.ends_at),
    )?;
    if body.capacity.is_some_and(|cap| cap < event.registered_count) {
        return Err(HearthError::Validation {
            message: format!(
                "Capacity cannot drop below the {} existing registrations",
                event.registered_count
            ),
        });
    }

    let updated = events::update_event(
        &state.db.pool,
        event_id,
        &EventChanges {
            title: body.title.as_deref().map(str::trim),
            description: body.description.as_deref(),
            location: body.location.as_deref(),
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            capacity: body.capacity,
        },
    )
    .await?
    .ok_or_else(|| HearthError::not_found("Event"))?;

    tracing::info!(event_id = %event_id, actor = %auth.user_id, "Event updated");

    reply("Event updated", updated)
}

/// DELETE /api/v1/events/{event_id}
async fn delete_event(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Uuid> {
    let (_, access) = load(&state, &auth, event_id).await?;
    access.require(Permissions::MANAGE_EVENTS)?;

    events::delete_event(&state.db.pool, event_id).await?;
    tracing::info!(event_id = %event_id, actor = %auth.user_id, "Event deleted");

    reply("Event deleted", event_id)
}

/// POST /api/v1/events/{event_id}/register
async fn register(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Event> {
    let (_, access) = load(&state, &auth, event_id).await?;
    access.require(Permissions::REGISTER_EVENTS)?;

    match events::register(&state.db.pool, event_id, auth.user_id).await? {
        Registration::Registered => {}
        Registration::AlreadyRegistered => {
            return Err(HearthError::AlreadyExists {
                resource: "Registration".into(),
            });
        }
        Registration::Full => {
            return Err(HearthError::LimitReached {
                message: "This event is full".into(),
            });
        }
    }

    tracing::info!(event_id = %event_id, user_id = %auth.user_id, "Registered for event");

    let event = events::find_by_id(&state.db.pool, event_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Event"))?;
    reply("Registered", event)
}

/// DELETE /api/v1/events/{event_id}/register
async fn unregister(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Event> {
    load(&state, &auth, event_id).await?;

    if !events::unregister(&state.db.pool, event_id, auth.user_id).await? {
        return Err(HearthError::not_found("Registration"));
    }

    tracing::info!(event_id = %event_id, user_id = %auth.user_id, "Unregistered from event");

    let event = events::find_by_id(&state.db.pool, event_id)
        .await?
        .ok_or_else(|| HearthError::not_found("Event"))?;
    reply("Registration cancelled", event)
}

/// GET /api/v1/events/{event_id}/registrations
async fn list_registrations(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Vec<EventRegistration>> {
    let (_, access) = load(&state, &auth, event_id).await?;
    access.require(Permissions::MANAGE_EVENTS)?;

    let list = events::list_registrations(&state.db.pool, event_id).await?;
    reply("ok", list)
}
