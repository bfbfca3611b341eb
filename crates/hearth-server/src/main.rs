//! # Hearth Server
//!
//! Binary entry point: serves the REST API, runs migrations, and grants the
//! platform admin role.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hearth_api::{AppState, build_router};
use hearth_common::models::user::PlatformRole;
use hearth_db::{Database, repository::users};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth community portal server", version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, env = "HEARTH_LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations, then serve the API (default)
    Serve,

    /// Run database migrations and exit
    Migrate,

    /// Give an existing account the platform admin role
    GrantAdmin { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = hearth_common::config::init()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hearth=debug,tower_http=debug".into());
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    let db = Database::connect(config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => db.migrate().await,
        Command::GrantAdmin { email } => {
            let user = users::find_by_email(&db.pool, &email)
                .await?
                .with_context(|| format!("no account with email {email}"))?;
            users::set_role(&db.pool, user.id, PlatformRole::Admin).await?;
            tracing::info!(user_id = %user.id, "Granted platform admin");
            Ok(())
        }
        Command::Serve => {
            tracing::info!("Starting Hearth v{}", env!("CARGO_PKG_VERSION"));
            db.migrate().await?;

            let router = build_router(AppState::new(db, config));
            let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

            tracing::info!("REST API listening on http://{addr}");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
            Ok(())
        }
    }
}
