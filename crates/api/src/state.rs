use std::sync::Arc;

use yamdb_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: yamdb_db::DbPool,
    /// Server configuration (JWT, confirmation codes, page size).
    pub config: Arc<ServerConfig>,
    /// Delivery of confirmation codes.
    pub mailer: Arc<dyn Mailer>,
}
