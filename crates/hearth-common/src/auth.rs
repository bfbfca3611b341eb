//! JWT claims and access-token decoding, shared by the API middleware and the
//! token issuer in `hearth-api`.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::HearthError, models::user::PlatformRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every Hearth token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub name: String,
    pub role: PlatformRole,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

/// Decode a token and check its signature and expiry.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Decode a token presented on an API call. Refresh tokens are refused.
pub fn decode_access(token: &str, secret: &str) -> Result<Claims, HearthError> {
    let claims = validate_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        HearthError::InvalidToken
    })?;
    match claims.kind {
        TokenKind::Access => Ok(claims),
        TokenKind::Refresh => Err(HearthError::InvalidToken),
    }
}
