//! Review entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::permissions::Resource;
use yamdb_core::types::{DbId, Timestamp};

/// A `reviews` row joined with its author's username.
///
/// Serialized as `{id, title, author, text, score, pub_date}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    #[serde(rename = "title")]
    pub title_id: DbId,
    #[serde(skip_serializing)]
    pub author_id: DbId,
    /// The author's username.
    pub author: String,
    pub text: String,
    pub score: i32,
    pub pub_date: Timestamp,
}

impl Resource for Review {
    fn owner_id(&self) -> Option<DbId> {
        Some(self.author_id)
    }
}

/// DTO for creating a review. Title and author come from the request context.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub text: String,
    pub score: i32,
}

/// DTO for patching a review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}
