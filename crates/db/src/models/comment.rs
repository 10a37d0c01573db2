//! Comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::permissions::Resource;
use yamdb_core::types::{DbId, Timestamp};

/// A `comments` row joined with its author's username.
///
/// Serialized as `{id, review, author, text, pub_date}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    #[serde(rename = "review")]
    pub review_id: DbId,
    #[serde(skip_serializing)]
    pub author_id: DbId,
    pub author: String,
    pub text: String,
    pub pub_date: Timestamp,
}

impl Resource for Comment {
    fn owner_id(&self) -> Option<DbId> {
        Some(self.author_id)
    }
}

/// DTO for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub text: String,
}

/// DTO for patching a comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComment {
    pub text: Option<String>,
}
