//! Current-user routes.

use axum::{Extension, Router, extract::State, middleware, routing::get};
use hearth_common::{
    error::HearthError,
    models::{community::Community, join_request::JoinRequest, user::UserResponse},
};
use hearth_db::repository::{communities, join_requests, users};
use std::sync::Arc;

use crate::{
    AppState,
    middleware::AuthContext,
    response::{ApiResult, reply},
};

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/me/communities", get(my_communities))
        .route("/users/me/join-requests", get(my_join_requests))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

/// GET /api/v1/users/me
async fn get_me(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<UserResponse> {
    let user = users::find_by_id(&state.db.pool, auth.user_id)
        .await?
        .ok_or_else(|| HearthError::not_found("User"))?;
    reply("ok", user.into())
}

/// GET /api/v1/users/me/communities
async fn my_communities(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Community>> {
    let list = communities::list_user_communities(&state.db.pool, auth.user_id).await?;
    reply("ok", list)
}

/// GET /api/v1/users/me/join-requests
async fn my_join_requests(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<JoinRequest>> {
    let list = join_requests::list_for_user(&state.db.pool, auth.user_id).await?;
    reply("ok", list)
}
