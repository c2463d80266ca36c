/// Command-line interface for the taskgate binary
///
/// # Commands
///
/// - `serve` (default): run the HTTP API
/// - `migrate`: apply pending database migrations
/// - `seed`: create the initial admin account if its email is unused
/// - `hash-password`: print an Argon2id hash for manual inserts
///
/// ```bash
/// taskgate-api migrate
/// taskgate-api seed --email admin@example.com --password admin123
/// taskgate-api serve
/// ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskgate_shared::{
    auth::password,
    db::{
        adapter::DatabaseAdapter,
        migrations::{get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
        postgres::PostgresAdapter,
    },
    models::user::{CreateUser, Role, User},
};
use tokio::net::TcpListener;

use crate::{
    app::{build_router, AppState},
    config::Config,
};

#[derive(Debug, Parser)]
#[command(name = "taskgate-api")]
#[command(about = "Task management REST API with role-based access control")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve,

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create the initial admin user")]
    Seed {
        #[arg(long, env = "SEED_ADMIN_NAME", default_value = "Admin")]
        name: String,

        #[arg(long, env = "SEED_ADMIN_EMAIL")]
        email: String,

        #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(about = "Print an Argon2id hash for a password")]
    HashPassword { password: String },
}

/// Result of [`seed_admin`]
#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    Created(i64),
    AlreadyExists(i64),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(Config::from_env()?).await,
        Commands::Migrate => migrate(Config::from_env()?).await,
        Commands::Seed {
            name,
            email,
            password,
        } => {
            let config = Config::from_env()?;
            let pool = connect(&config).await?;
            let db = PostgresAdapter::new(pool.clone());

            match seed_admin(&db, &name, &email, &password).await? {
                SeedOutcome::Created(id) => println!("Admin user created (id {})", id),
                SeedOutcome::AlreadyExists(id) => {
                    println!("User {} already exists (id {}), nothing to do", email, id)
                }
            }

            close_pool(pool).await;
            Ok(())
        }
        Commands::HashPassword { password } => {
            println!("{}", password::hash_password(&password)?);
            Ok(())
        }
    }
}

/// Creates an admin account unless the email is already registered
pub async fn seed_admin(
    db: &dyn DatabaseAdapter,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<SeedOutcome> {
    if let Some(existing) = User::find_by_email(db, email).await? {
        tracing::info!(user_id = existing.id, "Seed skipped: email already registered");
        return Ok(SeedOutcome::AlreadyExists(existing.id));
    }

    let user = User::create(
        db,
        CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(password)?,
            role: Role::Admin,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Seeded admin user");
    Ok(SeedOutcome::Created(user.id))
}

async fn connect(config: &Config) -> anyhow::Result<sqlx::PgPool> {
    create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")
}

async fn migrate(config: Config) -> anyhow::Result<()> {
    let pool = connect(&config).await?;

    run_migrations(&pool).await?;
    let status = get_migration_status(&pool).await?;
    println!(
        "Applied {} migrations (latest: {})",
        status.applied_migrations,
        status
            .latest_version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    close_pool(pool).await;
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = connect(&config).await?;
    let address = config.bind_address();

    tracing::info!(
        validator = %config.policies.task_validator,
        authorization = %config.policies.authorization,
        "Policies selected"
    );

    // First unknown-email login would otherwise also pay for the placeholder hash
    password::verify_placeholder("");

    let state = AppState::new(Arc::new(PostgresAdapter::new(pool.clone())), config);
    let app = build_router(state);

    let listener = TcpListener::bind(address.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Completes on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
