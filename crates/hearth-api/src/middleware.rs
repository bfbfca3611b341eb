//! Authentication middleware.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use hearth_common::{auth, error::HearthError, models::user::PlatformRole};
use hearth_db::repository::users;
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub name: String,
    pub role: PlatformRole,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == PlatformRole::Admin
    }
}

/// Extract and validate the JWT from the `Authorization: Bearer <token>` header.
///
/// The platform role is read from the account on every request, so a grant or
/// demotion applies to tokens already issued.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, HearthError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(HearthError::Unauthorized)?;

    let claims = auth::decode_access(token, &state.auth.jwt_secret)?;
    let user = users::find_by_id(&state.db.pool, claims.sub)
        .await?
        .ok_or(HearthError::InvalidToken)?;

    request.extensions_mut().insert(AuthContext {
        user_id: user.id,
        name: user.name,
        role: user.role,
    });

    Ok(next.run(request).await)
}
