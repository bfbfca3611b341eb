//! Seed helpers shared by repository tests.

use hearth_common::models::{
    community::{Community, CommunityStatus},
    user::{PlatformRole, User},
};
use sqlx::AnyPool;
use uuid::Uuid;

use super::{communities, users};

pub async fn user(pool: &AnyPool, name: &str) -> User {
    users::create_user(
        pool,
        Uuid::now_v7(),
        name,
        &format!("{}@hearth.test", name.to_lowercase()),
        "hash",
        PlatformRole::Resident,
    )
    .await
    .unwrap()
}

/// An active community managed by `manager`.
pub async fn community(pool: &AnyPool, manager: &User) -> Community {
    communities::create_community(
        pool,
        Uuid::now_v7(),
        "Maple Court",
        Some("Residents of Maple Court"),
        CommunityStatus::Active,
        manager.id,
    )
    .await
    .unwrap()
}
