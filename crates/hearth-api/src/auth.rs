//! Password hashing and token issuance.
//!
//! Token decoding lives in `hearth_common::auth` next to the claims.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use hearth_common::{
    auth::{Claims, TokenKind},
    config::AuthConfig,
    models::user::User,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;

/// Token pair returned on login/register.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_token(
    user: &User,
    kind: TokenKind,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        kind,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Generate both access and refresh tokens for `user`.
pub fn generate_token_pair(
    user: &User,
    config: &AuthConfig,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access_token: generate_token(
            user,
            TokenKind::Access,
            &config.jwt_secret,
            config.access_token_ttl_secs,
        )?,
        refresh_token: generate_token(
            user,
            TokenKind::Refresh,
            &config.jwt_secret,
            config.refresh_token_ttl_secs,
        )?,
        expires_in: config.access_token_ttl_secs,
        token_type: "Bearer".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_common::{
        auth::{decode_access, validate_token},
        error::HearthError,
        models::user::PlatformRole,
    };
    use uuid::Uuid;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_tokens_carry_role_and_type() {
        let user = User {
            id: Uuid::now_v7(),
            name: "Ada".into(),
            email: "ada@hearth.test".into(),
            password_hash: String::new(),
            role: PlatformRole::Admin,
            created_at: Utc::now(),
        };
        let config = AuthConfig {
            jwt_secret: "secret".into(),
            access_token_ttl_secs: 60,
            refresh_token_ttl_secs: 3600,
        };

        let pair = generate_token_pair(&user, &config).unwrap();
        let access = decode_access(&pair.access_token, "secret").unwrap();
        assert_eq!(access.sub, user.id);
        assert_eq!(access.role, PlatformRole::Admin);

        let refresh = validate_token(&pair.refresh_token, "secret").unwrap();
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert!(matches!(
            decode_access(&pair.refresh_token, "secret"),
            Err(HearthError::InvalidToken)
        ));
        assert!(validate_token(&pair.access_token, "other").is_err());
    }
}
