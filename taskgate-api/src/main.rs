//! # taskgate API Server
//!
//! Task management REST API: JWT login, role-checked task CRUD and user
//! administration over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskgate-api -- migrate
//! cargo run -p taskgate-api -- serve
//! ```

use clap::Parser;
use taskgate_api::cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskgate_api=debug,taskgate_shared=debug,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(
        "taskgate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    taskgate_api::cli::run(Cli::parse()).await
}
