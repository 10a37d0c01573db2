//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- The authenticated user behind a JWT Bearer token.
//! - [`auth::OptionalAuth`] -- Same, but an absent header means anonymous.
//! - [`rbac::RequireAdmin`] -- Requires an admin or superuser.

pub mod auth;
pub mod rbac;

use axum::http::Method;
use yamdb_core::permissions::Access;

/// Safe methods only read; everything else writes.
pub fn access_for(method: &Method) -> Access {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        Access::Read
    } else {
        Access::Write
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_methods_are_reads() {
        assert_eq!(access_for(&Method::GET), Access::Read);
        assert_eq!(access_for(&Method::OPTIONS), Access::Read);
        assert_eq!(access_for(&Method::PATCH), Access::Write);
        assert_eq!(access_for(&Method::DELETE), Access::Write);
    }
}
