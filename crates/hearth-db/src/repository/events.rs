//! Event repository: community events and registrations.

use chrono::{DateTime, Utc};
use hearth_common::models::event::{Event, EventRegistration};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, now, timestamp};

/// Fields of a new event.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub community_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i64>,
    pub created_by: Uuid,
}

/// Fields of an event edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EventChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i64>,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    AlreadyRegistered,
    Full,
}

pub async fn create_event(pool: &AnyPool, id: Uuid, new: &NewEvent<'_>) -> Result<Event, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO events (id, community_id, title, description, location, starts_at, ends_at,
                            capacity, registered_count, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10, $10)
        "#,
    )
    .bind(id.to_string())
    .bind(new.community_id.to_string())
    .bind(new.title)
    .bind(new.description)
    .bind(new.location)
    .bind(timestamp(new.starts_at))
    .bind(timestamp(new.ends_at))
    .bind(new.capacity)
    .bind(new.created_by.to_string())
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// Events of a community, soonest first.
pub async fn list_events(
    pool: &AnyPool,
    community_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Event>, sqlx::Error> {
    Select::new("SELECT * FROM events WHERE 1 = 1")
        .and_eq("community_id", community_id)
        .page("starts_at ASC", limit, offset)
        .fetch_all(pool)
        .await
}

pub async fn update_event(
    pool: &AnyPool,
    id: Uuid,
    changes: &EventChanges<'_>,
) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE events SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            location = COALESCE($3, location),
            starts_at = COALESCE($4, starts_at),
            ends_at = COALESCE($5, ends_at),
            capacity = COALESCE($6, capacity),
            updated_at = $7
        WHERE id = $8
        "#,
    )
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.location)
    .bind(changes.starts_at.map(timestamp))
    .bind(changes.ends_at.map(timestamp))
    .bind(changes.capacity)
    .bind(now())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await
}

pub async fn delete_event(pool: &AnyPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM event_registrations WHERE event_id = $1")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() == 1)
}

/// Register a user, enforcing capacity.
///
/// The registration row and the counter move together; a full event rolls
/// the registration back.
pub async fn register(
    pool: &AnyPool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Registration, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO event_registrations (event_id, user_id, registered_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (event_id, user_id) DO NOTHING
        "#,
    )
    .bind(event_id.to_string())
    .bind(user_id.to_string())
    .bind(now())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted != 1 {
        tx.rollback().await?;
        return Ok(Registration::AlreadyRegistered);
    }

    let counted = sqlx::query(
        r#"
        UPDATE events SET registered_count = registered_count + 1
        WHERE id = $1 AND (capacity IS NULL OR registered_count < capacity)
        "#,
    )
    .bind(event_id.to_string())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if counted != 1 {
        tx.rollback().await?;
        return Ok(Registration::Full);
    }

    tx.commit().await?;
    Ok(Registration::Registered)
}

/// Remove a registration; `false` if the user was not registered.
pub async fn unregister(pool: &AnyPool, event_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if removed == 1 {
        sqlx::query(
            r#"
            UPDATE events
            SET registered_count = CASE WHEN registered_count > 0 THEN registered_count - 1 ELSE 0 END
            WHERE id = $1
            "#,
        )
        .bind(event_id.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(removed == 1)
}

pub async fn list_registrations(
    pool: &AnyPool,
    event_id: Uuid,
) -> Result<Vec<EventRegistration>, sqlx::Error> {
    sqlx::query_as::<_, EventRegistration>(
        "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY registered_at ASC",
    )
    .bind(event_id.to_string())
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::repository::fixtures;
    use chrono::Duration;

    async fn seed_event(db: &Database, capacity: Option<i64>) -> (Uuid, Event) {
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let starts_at = Utc::now() + Duration::days(3);
        let event = create_event(
            &db.pool,
            Uuid::now_v7(),
            &NewEvent {
                community_id: community.id,
                title: "Block party",
                description: None,
                location: Some("Courtyard"),
                starts_at,
                ends_at: starts_at + Duration::hours(4),
                capacity,
                created_by: owner.id,
            },
        )
        .await
        .unwrap();
        (owner.id, event)
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let db = Database::in_memory().await.unwrap();
        let (owner, event) = seed_event(&db, Some(1)).await;
        let guest = fixtures::user(&db.pool, "Guest").await;

        assert_eq!(register(&db.pool, event.id, owner).await.unwrap(), Registration::Registered);
        assert_eq!(register(&db.pool, event.id, owner).await.unwrap(), Registration::AlreadyRegistered);
        assert_eq!(register(&db.pool, event.id, guest.id).await.unwrap(), Registration::Full);

        let stored = find_by_id(&db.pool, event.id).await.unwrap().unwrap();
        assert_eq!(stored.registered_count, 1);
        assert!(stored.is_full());
        assert_eq!(list_registrations(&db.pool, event.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unregister_decrements() {
        let db = Database::in_memory().await.unwrap();
        let (owner, event) = seed_event(&db, None).await;

        register(&db.pool, event.id, owner).await.unwrap();
        assert!(unregister(&db.pool, event.id, owner).await.unwrap());
        assert!(!unregister(&db.pool, event.id, owner).await.unwrap());

        let stored = find_by_id(&db.pool, event.id).await.unwrap().unwrap();
        assert_eq!(stored.registered_count, 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let (owner, event) = seed_event(&db, None).await;
        register(&db.pool, event.id, owner).await.unwrap();

        let updated = update_event(
            &db.pool,
            event.id,
            &EventChanges {
                title: Some("Winter block party"),
                capacity: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.title, "Winter block party");
        assert_eq!(updated.capacity, Some(40));
        assert_eq!(updated.location.as_deref(), Some("Courtyard"));

        let listed = list_events(&db.pool, event.community_id, 10, 0).await.unwrap();
        assert_eq!(listed.len(), 1);

        assert!(delete_event(&db.pool, event.id).await.unwrap());
        assert!(list_registrations(&db.pool, event.id).await.unwrap().is_empty());
    }
}
