//! API route modules.

pub mod auth;
pub mod communities;
pub mod directory;
pub mod events;
pub mod health;
pub mod join_requests;
pub mod marketplace;
pub mod pulses;
pub mod sos;
pub mod users;
