//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::permissions::Principal;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Carries internal fields (`id`, `is_superuser`); use [`UserResponse`] for
/// external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
    pub is_superuser: bool,
    pub date_joined: Timestamp,
}

impl User {
    /// The parsed role. The column's `CHECK` constraint keeps it valid.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    /// The permission-checking view of this user.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            role: self.role(),
            is_superuser: self.is_superuser,
        }
    }
}

/// Public user representation.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_superuser: bool,
}

/// DTO for updating an existing user. All fields are optional.
///
/// `role` is only ever set by the admin endpoints; the self-service profile
/// endpoint leaves it `None`.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Query parameters for the admin user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    /// Case-insensitive substring of the username.
    pub search: Option<String>,
}
