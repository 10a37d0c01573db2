//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers check permissions, validate input with `yamdb_core`, delegate to
//! the corresponding repository in `yamdb_db`, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod auth;
pub mod categories;
pub mod comments;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;
