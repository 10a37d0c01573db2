use yamdb_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::auth::confirmation::ConfirmationConfig;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Items per page on every list endpoint (default: `10`).
    pub page_size: i64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Confirmation-code secret and lifetime.
    pub confirmation: ConfirmationConfig,
    /// Superuser to create or promote at startup, if configured.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Account guaranteed to exist as a superuser after startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
}

impl BootstrapAdmin {
    /// Read `ADMIN_USERNAME` / `ADMIN_EMAIL`; `None` unless both are set.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty())?;
        let email = std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty())?;
        Some(Self { username, email })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PAGE_SIZE`            | `10` (clamped to 1..=100)  |
    ///
    /// JWT, confirmation-code, and bootstrap settings are documented on
    /// [`JwtConfig::from_env`], [`ConfirmationConfig::from_env`], and
    /// [`BootstrapAdmin::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let page_size: i64 = std::env::var("PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse::<i64>()
            .expect("PAGE_SIZE must be a valid i64")
            .clamp(1, MAX_PAGE_SIZE);

        let jwt = JwtConfig::from_env();
        let confirmation = ConfirmationConfig::from_env(&jwt.secret);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            page_size,
            jwt,
            confirmation,
            bootstrap_admin: BootstrapAdmin::from_env(),
        }
    }
}
