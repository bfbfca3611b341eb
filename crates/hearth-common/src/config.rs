//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    let app_config = load()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Build a configuration without touching the global slot.
pub fn load() -> Result<AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::builder()
        // Defaults
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "sqlite://hearth.db?mode=rwc")?
        .set_default("database.max_connections", 20)?
        .set_default("database.min_connections", 1)?
        .set_default("auth.access_token_ttl_secs", 900)? // 15 min
        .set_default("auth.refresh_token_ttl_secs", 2_592_000)? // 30 days
        .set_default("limits.max_communities_per_user", 50)?
        .set_default("limits.max_pulse_length", 2000)?
        .set_default("limits.default_page_size", 50)?
        .set_default("limits.max_page_size", 200)?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (HEARTH__SERVER__PORT, HEARTH__DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("HEARTH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    cfg.try_deserialize()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `postgres://...` in production, `sqlite://...` for lite mode.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256). Should be 256+ bits of entropy.
    pub jwt_secret: String,
    /// Access token TTL in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub max_communities_per_user: u32,
    pub max_pulse_length: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl LimitsConfig {
    /// Clamp a requested page size into `1..=max_page_size`.
    pub fn page_size(&self, requested: Option<u32>) -> i64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1)) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        let limits = LimitsConfig {
            max_communities_per_user: 5,
            max_pulse_length: 100,
            default_page_size: 50,
            max_page_size: 200,
        };
        assert_eq!(limits.page_size(None), 50);
        assert_eq!(limits.page_size(Some(0)), 1);
        assert_eq!(limits.page_size(Some(10_000)), 200);
    }
}
