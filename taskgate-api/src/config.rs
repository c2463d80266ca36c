/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string. When unset it is assembled
///   from `DB_HOST` (default: localhost), `DB_PORT` (default: 5432), `DB_USER`,
///   `DB_PASSWORD` and `DB_NAME`
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `JWT_EXPIRATION_HOURS`: Token lifetime in hours, 1 to 8760 (default: 2)
/// - `TASK_VALIDATOR`: `basic` or `strict` (default: basic)
/// - `AUTHORIZATION_STRATEGY`: `role-based`, `hierarchical` or `strict` (default: role-based)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskgate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use anyhow::Context;
use taskgate_shared::auth::authorization::AuthorizationPolicy;
use taskgate_shared::validation::TaskValidator;
use url::Url;

/// Longest accepted token lifetime (one year)
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 8760;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Pluggable validation and authorization policies
    pub policies: PolicyConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in hours
    pub expiration_hours: i64,
}

/// Policy selection
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyConfig {
    /// Validator applied to task writes
    pub task_validator: TaskValidator,

    /// Policy used to compare roles
    pub authorization: AuthorizationPolicy,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    /// - A policy name is not recognized
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expiration_hours = lookup("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|| "2".to_string())
            .parse::<i64>()
            .context("JWT_EXPIRATION_HOURS must be an integer")?;

        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&expiration_hours) {
            anyhow::bail!(
                "JWT_EXPIRATION_HOURS must be between 1 and {}",
                MAX_JWT_EXPIRATION_HOURS
            );
        }

        let task_validator = lookup("TASK_VALIDATOR")
            .unwrap_or_else(|| "basic".to_string())
            .parse::<TaskValidator>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let authorization = lookup("AUTHORIZATION_STRATEGY")
            .unwrap_or_else(|| "role-based".to_string())
            .parse::<AuthorizationPolicy>()
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
            policies: PolicyConfig {
                task_validator,
                authorization,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Token lifetime as a duration
    pub fn jwt_expiration(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt.expiration_hours)
    }

    /// Whether CORS should accept any origin
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Assembles a PostgreSQL URL from `DB_*` variables
fn database_url_from_parts<F>(lookup: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let user = lookup("DB_USER")
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL or DB_USER environment variable is required"))?;
    let name = lookup("DB_NAME")
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL or DB_NAME environment variable is required"))?;
    let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = lookup("DB_PORT")
        .unwrap_or_else(|| "5432".to_string())
        .parse::<u16>()
        .context("DB_PORT must be a valid port number")?;

    let mut url = Url::parse("postgresql://localhost")?;
    url.set_host(Some(host.as_str())).context("DB_HOST is not a valid host")?;
    url.set_port(Some(port))
        .map_err(|_| anyhow::anyhow!("DB_PORT cannot be applied to the database URL"))?;
    url.set_username(&user)
        .map_err(|_| anyhow::anyhow!("DB_USER cannot be applied to the database URL"))?;
    if let Some(password) = lookup("DB_PASSWORD") {
        url.set_password(Some(password.as_str()))
            .map_err(|_| anyhow::anyhow!("DB_PASSWORD cannot be applied to the database URL"))?;
    }
    url.set_path(&name);

    Ok(url.to_string())
}
