//! User repository: platform accounts.

use hearth_common::models::user::{PlatformRole, User};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{now, search_key};

/// Create a new user account.
pub async fn create_user(
    pool: &AnyPool,
    id: Uuid,
    name: &str,
    email: &str,
    password_hash: &str,
    role: PlatformRole,
) -> Result<User, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, search_key, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(email.to_lowercase())
    .bind(password_hash)
    .bind(role.as_str())
    .bind(search_key(name, email))
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Find a user by their unique ID.
pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// Find a user by email (case-insensitive).
pub async fn find_by_email(pool: &AnyPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await
}

/// Change a user's platform role. Returns `false` for an unknown user.
pub async fn set_role(pool: &AnyPool, id: Uuid, role: PlatformRole) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
        .bind(role.as_str())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
