//! Event model: a scheduled community event with registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub community_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Max registrations (None = unlimited)
    pub capacity: Option<i64>,
    /// Denormalized count of registration rows.
    pub registered_count: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.registered_count >= cap)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRegistration {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    pub community_id: Uuid,

    #[validate(length(min = 2, max = 150, message = "Title must be 2-150 characters"))]
    pub title: String,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    #[validate(length(max = 300))]
    pub location: Option<String>,

    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 2, max = 150, message = "Title must be 2-150 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    #[validate(length(max = 300))]
    pub location: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i64>,
}
