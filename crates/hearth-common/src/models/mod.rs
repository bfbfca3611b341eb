//! Core domain models shared across all Hearth services.
//!
//! These are the "truth" types: what the database stores and the API
//! serializes. Every entity is keyed by a time-sortable UUID v7.

pub mod community;
pub mod event;
pub mod join_request;
pub mod listing;
pub mod member;
pub mod pulse;
pub mod sos;
pub mod user;

pub use community::*;
pub use event::*;
pub use join_request::*;
pub use listing::*;
pub use member::*;
pub use pulse::*;
pub use sos::*;
pub use user::*;
