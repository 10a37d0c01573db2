//! Composable permission predicates.
//!
//! A [`Permission`] is evaluated twice per request: once at request level
//! ([`Permission::has_permission`]) before any resource is loaded, and once
//! at object level ([`Permission::has_object_permission`]) against the
//! resource being read or mutated. Leaves are combined with
//! [`Permission::and`], [`Permission::or`], and [`Permission::not`].
//!
//! Combinator semantics:
//!
//! | Combinator | request level | object level                           |
//! |------------|---------------|----------------------------------------|
//! | `a.and(b)` | `a && b`      | `a.obj && b.obj`                       |
//! | `a.or(b)`  | `a \|\| b`    | `(a && a.obj) \|\| (b && b.obj)`       |
//! | `a.not()`  | `!a`          | `!a.obj`                               |
//!
//! The ready-made policies live in [`policies`].

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role: Role,
    pub is_superuser: bool,
}

impl Principal {
    /// Admins and superusers share full catalog and user-management rights.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }
}

/// Whoever issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(Principal),
}

impl Actor {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Actor::Anonymous => None,
            Actor::User(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }
}

/// Whether the request only reads (GET/HEAD/OPTIONS) or mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A resource that object-level permissions can inspect.
pub trait Resource {
    /// The owning user, for resources that have an author.
    fn owner_id(&self) -> Option<DbId> {
        None
    }
}

/// Resource stand-in for catalog entries, which have no owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unowned;

impl Resource for Unowned {}

/// The inputs every permission sees.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub actor: &'a Actor,
    pub access: Access,
}

impl<'a> RequestContext<'a> {
    pub fn new(actor: &'a Actor, access: Access) -> Self {
        Self { actor, access }
    }
}

pub trait Permission {
    fn has_permission(&self, _ctx: &RequestContext<'_>) -> bool {
        true
    }

    fn has_object_permission(&self, _ctx: &RequestContext<'_>, _obj: &dyn Resource) -> bool {
        true
    }

    fn and<P: Permission>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
    {
        And(self, other)
    }

    fn or<P: Permission>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
    {
        Or(self, other)
    }

    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(pub A, pub B);

impl<A: Permission, B: Permission> Permission for And<A, B> {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> bool {
        self.0.has_permission(ctx) && self.1.has_permission(ctx)
    }

    fn has_object_permission(&self, ctx: &RequestContext<'_>, obj: &dyn Resource) -> bool {
        self.0.has_object_permission(ctx, obj) && self.1.has_object_permission(ctx, obj)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(pub A, pub B);

impl<A: Permission, B: Permission> Permission for Or<A, B> {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> bool {
        self.0.has_permission(ctx) || self.1.has_permission(ctx)
    }

    // A branch grants object access only if it also holds at request level.
    fn has_object_permission(&self, ctx: &RequestContext<'_>, obj: &dyn Resource) -> bool {
        (self.0.has_permission(ctx) && self.0.has_object_permission(ctx, obj))
            || (self.1.has_permission(ctx) && self.1.has_object_permission(ctx, obj))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Not<A>(pub A);

impl<A: Permission> Permission for Not<A> {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> bool {
        !self.0.has_permission(ctx)
    }

    fn has_object_permission(&self, ctx: &RequestContext<'_>, obj: &dyn Resource) -> bool {
        !self.0.has_object_permission(ctx, obj)
    }
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// The caller presented a valid token.
#[derive(Debug, Clone, Copy)]
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> bool {
        ctx.actor.is_authenticated()
    }

    fn has_object_permission(&self, ctx: &RequestContext<'_>, _obj: &dyn Resource) -> bool {
        ctx.actor.is_authenticated()
    }
}

/// Safe (non-mutating) access only.
#[derive(Debug, Clone, Copy)]
pub struct ReadOnly;

impl Permission for ReadOnly {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> bool {
        ctx.access == Access::Read
    }

    fn has_object_permission(&self, ctx: &RequestContext<'_>, _obj: &dyn Resource) -> bool {
        ctx.access == Access::Read
    }
}

/// The caller owns the resource.
#[derive(Debug, Clone, Copy)]
pub struct IsAuthor;

impl Permission for IsAuthor {
    fn has_object_permission(&self, ctx: &RequestContext<'_>, obj: &dyn Resource) -> bool {
        match (ctx.actor.principal(), obj.owner_id()) {
            (Some(principal), Some(owner)) => principal.user_id == owner,
            _ => false,
        }
    }
}

/// The caller is a moderator. Only restricts at object level.
#[derive(Debug, Clone, Copy)]
pub struct IsModerator;

impl Permission for IsModerator {
    fn has_object_permission(&self, ctx: &RequestContext<'_>, _obj: &dyn Resource) -> bool {
        ctx.actor
            .principal()
            .is_some_and(|p| p.role == Role::Moderator)
    }
}

/// The caller is an admin or a superuser.
#[derive(Debug, Clone, Copy)]
pub struct IsAdmin;

impl Permission for IsAdmin {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> bool {
        ctx.actor.principal().is_some_and(Principal::is_admin)
    }

    fn has_object_permission(&self, ctx: &RequestContext<'_>, _obj: &dyn Resource) -> bool {
        ctx.actor.principal().is_some_and(Principal::is_admin)
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// The three policies the API enforces.
pub mod policies {
    use super::*;

    /// User management: authenticated admins only.
    pub fn admin_only() -> impl Permission {
        IsAuthenticated.and(IsAdmin)
    }

    /// Categories, genres, and titles: admins mutate, everyone reads.
    pub fn admin_or_read_only() -> impl Permission {
        IsAuthenticated.and(IsAdmin).or(ReadOnly)
    }

    /// Reviews and comments: the author, a moderator, or an admin mutates;
    /// everyone reads. Any authenticated user may create.
    pub fn author_staff_or_read_only() -> impl Permission {
        IsAuthenticated
            .and(IsAuthor.or(IsModerator).or(IsAdmin))
            .or(ReadOnly)
    }
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Evaluate `policy` for the request and, if given, the target resource.
///
/// A denial is [`CoreError::Unauthorized`] for anonymous callers (they may
/// succeed after authenticating) and [`CoreError::Forbidden`] otherwise.
pub fn authorize(
    policy: &impl Permission,
    actor: &Actor,
    access: Access,
    resource: Option<&dyn Resource>,
) -> Result<(), CoreError> {
    let ctx = RequestContext::new(actor, access);

    let allowed = policy.has_permission(&ctx)
        && resource.map_or(true, |obj| policy.has_object_permission(&ctx, obj));

    if allowed {
        return Ok(());
    }

    if actor.is_authenticated() {
        Err(CoreError::Forbidden(
            "You do not have permission to perform this action".into(),
        ))
    } else {
        Err(CoreError::Unauthorized(
            "Authentication credentials were not provided".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::policies::*;
    use super::*;
    use assert_matches::assert_matches;

    struct Owned(DbId);

    impl Resource for Owned {
        fn owner_id(&self) -> Option<DbId> {
            Some(self.0)
        }
    }

    fn user(id: DbId, role: Role) -> Actor {
        Actor::User(Principal {
            user_id: id,
            role,
            is_superuser: false,
        })
    }

    fn superuser(id: DbId) -> Actor {
        Actor::User(Principal {
            user_id: id,
            role: Role::User,
            is_superuser: true,
        })
    }

    // -- Leaves ------------------------------------------------------------

    #[test]
    fn read_only_allows_only_reads() {
        let actor = Actor::Anonymous;
        assert!(ReadOnly.has_permission(&RequestContext::new(&actor, Access::Read)));
        assert!(!ReadOnly.has_permission(&RequestContext::new(&actor, Access::Write)));
    }

    #[test]
    fn is_admin_accepts_superuser_with_plain_role() {
        let actor = superuser(1);
        let ctx = RequestContext::new(&actor, Access::Write);
        assert!(IsAdmin.has_permission(&ctx));
    }

    #[test]
    fn is_admin_rejects_anonymous() {
        let ctx = RequestContext::new(&Actor::Anonymous, Access::Read);
        assert!(!IsAdmin.has_permission(&ctx));
    }

    #[test]
    fn is_author_matches_owner_only() {
        let actor = user(5, Role::User);
        let ctx = RequestContext::new(&actor, Access::Write);
        assert!(IsAuthor.has_object_permission(&ctx, &Owned(5)));
        assert!(!IsAuthor.has_object_permission(&ctx, &Owned(6)));
        assert!(!IsAuthor.has_object_permission(&ctx, &Unowned));
    }

    #[test]
    fn not_inverts_both_levels() {
        let actor = Actor::Anonymous;
        let ctx = RequestContext::new(&actor, Access::Read);
        let p = ReadOnly.not();
        assert!(!p.has_permission(&ctx));
        assert!(!p.has_object_permission(&ctx, &Unowned));
    }

    // -- Combinators -------------------------------------------------------

    /// Fails at request level, passes at object level.
    struct RequestDenied;

    impl Permission for RequestDenied {
        fn has_permission(&self, _ctx: &RequestContext<'_>) -> bool {
            false
        }
    }

    #[test]
    fn or_object_level_requires_branch_to_pass_request_level_too() {
        let actor = user(1, Role::User);
        let ctx = RequestContext::new(&actor, Access::Write);
        let p = RequestDenied.or(ReadOnly);
        assert!(RequestDenied.has_object_permission(&ctx, &Unowned));
        assert!(!p.has_object_permission(&ctx, &Unowned));
    }

    #[test]
    fn and_short_circuits_on_request_level() {
        let ctx = RequestContext::new(&Actor::Anonymous, Access::Write);
        assert!(!IsAuthenticated.and(IsAuthor).has_permission(&ctx));
    }

    // -- Policies ----------------------------------------------------------

    #[test]
    fn catalog_policy_lets_anyone_read() {
        assert!(authorize(&admin_or_read_only(), &Actor::Anonymous, Access::Read, None).is_ok());
        assert!(
            authorize(&admin_or_read_only(), &user(2, Role::User), Access::Read, None).is_ok()
        );
    }

    #[test]
    fn catalog_policy_write_requires_admin() {
        assert_matches!(
            authorize(&admin_or_read_only(), &Actor::Anonymous, Access::Write, None),
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(
            authorize(&admin_or_read_only(), &user(2, Role::Moderator), Access::Write, None),
            Err(CoreError::Forbidden(_))
        );
        assert!(
            authorize(&admin_or_read_only(), &user(3, Role::Admin), Access::Write, None).is_ok()
        );
        assert!(authorize(&admin_or_read_only(), &superuser(4), Access::Write, None).is_ok());
    }

    #[test]
    fn content_policy_allows_any_authenticated_create() {
        let policy = author_staff_or_read_only();
        assert!(authorize(&policy, &user(9, Role::User), Access::Write, None).is_ok());
        assert_matches!(
            authorize(&policy, &Actor::Anonymous, Access::Write, None),
            Err(CoreError::Unauthorized(_))
        );
    }

    #[test]
    fn content_policy_object_write_rules() {
        let policy = author_staff_or_read_only();
        let review = Owned(10);

        assert!(authorize(&policy, &user(10, Role::User), Access::Write, Some(&review)).is_ok());
        assert!(
            authorize(&policy, &user(11, Role::Moderator), Access::Write, Some(&review)).is_ok()
        );
        assert!(authorize(&policy, &user(12, Role::Admin), Access::Write, Some(&review)).is_ok());
        assert_matches!(
            authorize(&policy, &user(13, Role::User), Access::Write, Some(&review)),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            authorize(&policy, &Actor::Anonymous, Access::Write, Some(&review)),
            Err(CoreError::Unauthorized(_))
        );
    }

    #[test]
    fn content_policy_object_read_is_public() {
        let policy = author_staff_or_read_only();
        assert!(authorize(&policy, &Actor::Anonymous, Access::Read, Some(&Owned(1))).is_ok());
    }

    #[test]
    fn admin_only_policy() {
        let policy = admin_only();
        assert!(authorize(&policy, &user(1, Role::Admin), Access::Read, None).is_ok());
        assert_matches!(
            authorize(&policy, &user(2, Role::Moderator), Access::Read, None),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            authorize(&policy, &Actor::Anonymous, Access::Read, None),
            Err(CoreError::Unauthorized(_))
        );
    }
}
