//! Hearth client SDK for Rust.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use hearth_sdk::{RestClient, moderation::JoinRequestQueue};
//!
//! #[tokio::main]
//! async fn main() -> hearth_sdk::Result<()> {
//!     let rest = RestClient::new(Some("my-access-token"), None)?;
//!
//!     let mut queue = JoinRequestQueue::new(rest, "community-id");
//!     queue.refresh().await?;
//!     if let Some(first) = queue.items().first().map(|r| r.id.clone()) {
//!         queue.approve(&first).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod builders;
pub mod directory;
pub mod envelope;
pub mod error;
pub mod moderation;
pub mod rest;
pub mod types;

pub use error::{HearthError, Result};
pub use rest::RestClient;
pub use types::*;
