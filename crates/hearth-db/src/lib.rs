//! # hearth-db
//!
//! Database layer for Hearth. Everything goes through a `sqlx::AnyPool` so the
//! same repositories serve:
//! - **PostgreSQL**: production deployments
//! - **SQLite**: lite mode (single binary, file database) and tests (in-memory)

pub mod any_compat;
pub mod repository;

use anyhow::Result;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

/// Shared database state passed through Axum state.
#[derive(Clone)]
pub struct Database {
    pub pool: AnyPool,
}

impl Database {
    /// Connect using the `[database]` section of the app config.
    pub async fn connect(config: &hearth_common::config::AppConfig) -> Result<Self> {
        Self::connect_url(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
    }

    /// Connect to any supported backend by URL (`postgres://`, `sqlite://`).
    pub async fn connect_url(url: &str, max_connections: u32, min_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();

        tracing::info!(backend = backend_name(url), "Connecting to database...");
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(url)
            .await?;
        tracing::info!("Connected to database");

        Ok(Self { pool })
    }

    /// A migrated, private in-memory SQLite database (tests, demos).
    ///
    /// Pinned to a single connection that never idles out: every SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Health check: verify the database is reachable.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

fn backend_name(url: &str) -> &'static str {
    if url.starts_with("postgres") {
        "postgres"
    } else if url.starts_with("sqlite") {
        "sqlite"
    } else {
        "unknown"
    }
}
