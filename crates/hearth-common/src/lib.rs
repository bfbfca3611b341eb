//! # hearth-common
//!
//! Shared types, configuration, error handling, and workflow rules used across
//! all Hearth crates. No I/O lives here, just primitives and contracts.

pub mod any_row;
pub mod auth;
pub mod config;
pub mod error;
pub mod id;
pub mod models;
pub mod permissions;
pub mod price;
pub mod validation;
pub mod workflow;
