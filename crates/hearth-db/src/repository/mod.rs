//! Repository layer: query functions organized by domain.

pub mod communities;
pub mod events;
pub mod join_requests;
pub mod listings;
pub mod members;
pub mod pulses;
pub mod sos;
pub mod users;

#[cfg(test)]
pub(crate) mod fixtures;
