//! Manual `sqlx::FromRow<'_, sqlx::any::AnyRow>` implementations for the
//! hearth-common model types.
//!
//! `sqlx::AnyPool` only decodes primitive types natively (i64, f64, bool,
//! String, bytes). UUID and timestamp columns are stored as text and parsed
//! here; status columns are stored as their snake_case names.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row, any::AnyRow};
use uuid::Uuid;

use crate::models::{
    community::{Community, CommunityStatus},
    event::{Event, EventRegistration},
    join_request::{JoinRequest, JoinRequestStatus},
    listing::{Listing, ListingStatus},
    member::{DirectoryEntry, Member, MemberRole, MemberStatus},
    pulse::{Pulse, PulseStatus},
    sos::{SosAlert, SosStatus},
    user::{PlatformRole, User},
};

// ── Internal helpers ──────────────────────────────────────────────────────────

fn uuid(row: &AnyRow, col: &str) -> Result<Uuid, sqlx::Error> {
    let s: String = row.try_get(col)?;
    Uuid::parse_str(&s).map_err(|e| sqlx::Error::Decode(Box::new(e) as _))
}

fn opt_uuid(row: &AnyRow, col: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let s: Option<String> = row.try_get(col)?;
    s.map(|v| Uuid::parse_str(&v).map_err(|e| sqlx::Error::Decode(Box::new(e) as _)))
        .transpose()
}

fn dt(row: &AnyRow, col: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let s: String = row.try_get(col)?;
    parse_dt(&s).map_err(sqlx::Error::Decode)
}

fn opt_dt(row: &AnyRow, col: &str) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let s: Option<String> = row.try_get(col)?;
    s.map(|v| parse_dt(&v).map_err(sqlx::Error::Decode))
        .transpose()
}

/// Parse a stored timestamp. Hearth writes RFC 3339; the SQLite
/// `CURRENT_TIMESTAMP` shape is accepted for rows written by hand.
pub fn parse_dt(
    s: &str,
) -> Result<DateTime<Utc>, Box<dyn std::error::Error + Send + Sync + 'static>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Ok(d.with_timezone(&Utc));
    }
    if let Ok(d) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(d.and_utc());
    }
    if let Ok(d) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(d.and_utc());
    }
    Err(format!("cannot parse timestamp '{s}'").into())
}

fn parse_enum<T>(
    row: &AnyRow,
    col: &str,
    f: impl Fn(&str) -> Option<T>,
) -> Result<T, sqlx::Error> {
    let s: String = row.try_get(col)?;
    f(&s).ok_or_else(|| sqlx::Error::Decode(format!("unknown enum variant: {s}").into()))
}

// ── User ──────────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for User {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: parse_enum(row, "role", PlatformRole::parse)?,
            created_at: dt(row, "created_at")?,
        })
    }
}

// ── Community ─────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for Community {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: parse_enum(row, "status", CommunityStatus::parse)?,
            member_count: row.try_get("member_count")?,
            created_by: uuid(row, "created_by")?,
            created_at: dt(row, "created_at")?,
            updated_at: dt(row, "updated_at")?,
        })
    }
}

// ── Member ────────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for Member {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: uuid(row, "user_id")?,
            community_id: uuid(row, "community_id")?,
            role: parse_enum(row, "role", MemberRole::parse)?,
            status: parse_enum(row, "status", MemberStatus::parse)?,
            joined_at: dt(row, "joined_at")?,
        })
    }
}

impl<'r> FromRow<'r, AnyRow> for DirectoryEntry {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: uuid(row, "user_id")?,
            community_id: uuid(row, "community_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: parse_enum(row, "role", MemberRole::parse)?,
            status: parse_enum(row, "status", MemberStatus::parse)?,
            joined_at: dt(row, "joined_at")?,
        })
    }
}

// ── JoinRequest ───────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for JoinRequest {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            user_id: uuid(row, "user_id")?,
            community_id: uuid(row, "community_id")?,
            message: row.try_get("message")?,
            status: parse_enum(row, "status", JoinRequestStatus::parse)?,
            created_at: dt(row, "created_at")?,
            resolved_at: opt_dt(row, "resolved_at")?,
            resolved_by: opt_uuid(row, "resolved_by")?,
        })
    }
}

// ── Pulse ─────────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for Pulse {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            community_id: uuid(row, "community_id")?,
            user_id: uuid(row, "user_id")?,
            content: row.try_get("content")?,
            status: parse_enum(row, "status", PulseStatus::parse)?,
            created_at: dt(row, "created_at")?,
            updated_at: dt(row, "updated_at")?,
        })
    }
}

// ── Listing ───────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for Listing {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            community_id: uuid(row, "community_id")?,
            user_id: uuid(row, "user_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            status: parse_enum(row, "status", ListingStatus::parse)?,
            created_at: dt(row, "created_at")?,
            updated_at: dt(row, "updated_at")?,
        })
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for Event {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            community_id: uuid(row, "community_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            starts_at: dt(row, "starts_at")?,
            ends_at: dt(row, "ends_at")?,
            capacity: row.try_get("capacity")?,
            registered_count: row.try_get("registered_count")?,
            created_by: uuid(row, "created_by")?,
            created_at: dt(row, "created_at")?,
            updated_at: dt(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, AnyRow> for EventRegistration {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            event_id: uuid(row, "event_id")?,
            user_id: uuid(row, "user_id")?,
            registered_at: dt(row, "registered_at")?,
        })
    }
}

// ── SosAlert ──────────────────────────────────────────────────────────────────

impl<'r> FromRow<'r, AnyRow> for SosAlert {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: uuid(row, "id")?,
            community_id: uuid(row, "community_id")?,
            user_id: uuid(row, "user_id")?,
            message: row.try_get("message")?,
            location: row.try_get("location")?,
            status: parse_enum(row, "status", SosStatus::parse)?,
            created_at: dt(row, "created_at")?,
            updated_at: dt(row, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dt_formats() {
        assert!(parse_dt("2025-01-15T10:30:00+00:00").is_ok());
        assert!(parse_dt("2025-01-15T10:30:00.123456Z").is_ok());
        assert!(parse_dt("2025-01-15 10:30:00").is_ok());
        assert!(parse_dt("yesterday").is_err());
    }
}
