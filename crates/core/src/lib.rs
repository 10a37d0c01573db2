//! Domain logic for the YaMDb review service.
//!
//! Everything here is free of I/O so it can be exercised by plain unit tests
//! and shared by the repository and HTTP layers.

pub mod catalog;
pub mod confirmation;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod reviews;
pub mod roles;
pub mod types;
pub mod users;
