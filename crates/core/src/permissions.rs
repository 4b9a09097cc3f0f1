//! Access control predicates.
//!
//! Every endpoint picks one [`Permission`] and evaluates it against the
//! request method, the requester (if any), and the target resource's
//! author (if any). The predicates are pure functions; no permission
//! decision consults the database.

use yamdb_common::{AppError, AppResult};
use yamdb_db::entities::user::{self, Role};

/// Whether an HTTP method only reads state.
#[must_use]
pub fn is_safe_method(method: &str) -> bool {
    matches!(method, "GET" | "HEAD" | "OPTIONS")
}

/// Whether a user has admin-level access.
///
/// Superusers are always admins regardless of their stored role.
#[must_use]
pub const fn is_admin(role: Role, is_superuser: bool) -> bool {
    is_superuser || matches!(role, Role::Admin)
}

/// Whether a user is a moderator.
#[must_use]
pub const fn is_moderator(role: Role) -> bool {
    matches!(role, Role::Moderator)
}

/// Per-endpoint access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Reads are open; writes require any authenticated user.
    ReadOnlyOrAuthenticated,
    /// Reads are open; writes require an admin.
    AdminOrReadOnly,
    /// Reads are open; writes require the resource author, a moderator,
    /// or an admin.
    AuthorModeratorAdminOrReadOnly,
    /// All access requires an admin (or superuser).
    AdminOrSuperuserOnly,
}

impl Permission {
    /// Evaluate the policy for one request.
    ///
    /// `target_author` is the author of the resource being written, when
    /// one exists; creation passes `None` and only requires
    /// authentication. Missing credentials on a protected operation
    /// yield 401, an authenticated but unauthorized requester 403.
    pub fn check(
        self,
        method: &str,
        requester: Option<&user::Model>,
        target_author: Option<i64>,
    ) -> AppResult<()> {
        match self {
            Self::ReadOnlyOrAuthenticated => {
                if is_safe_method(method) {
                    return Ok(());
                }
                requester.map(|_| ()).ok_or(AppError::Unauthorized)
            }
            Self::AdminOrReadOnly => {
                if is_safe_method(method) {
                    return Ok(());
                }
                let user = requester.ok_or(AppError::Unauthorized)?;
                if is_admin(user.role, user.is_superuser) {
                    Ok(())
                } else {
                    Err(AppError::Forbidden(
                        "admin access required".to_string(),
                    ))
                }
            }
            Self::AuthorModeratorAdminOrReadOnly => {
                if is_safe_method(method) {
                    return Ok(());
                }
                let user = requester.ok_or(AppError::Unauthorized)?;
                let allowed = match target_author {
                    None => true,
                    Some(author_id) => {
                        author_id == user.id
                            || is_moderator(user.role)
                            || is_admin(user.role, user.is_superuser)
                    }
                };
                if allowed {
                    Ok(())
                } else {
                    Err(AppError::Forbidden(
                        "only the author, a moderator, or an admin may modify this".to_string(),
                    ))
                }
            }
            Self::AdminOrSuperuserOnly => {
                let user = requester.ok_or(AppError::Unauthorized)?;
                if is_admin(user.role, user.is_superuser) {
                    Ok(())
                } else {
                    Err(AppError::Forbidden(
                        "admin access required".to_string(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(id: i64, role: Role, is_superuser: bool) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role,
            is_superuser,
            confirmation_code: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_is_admin_role_matrix() {
        assert!(is_admin(Role::Admin, false));
        assert!(is_admin(Role::User, true));
        assert!(is_admin(Role::Moderator, true));
        assert!(!is_admin(Role::User, false));
        assert!(!is_admin(Role::Moderator, false));
    }

    #[test]
    fn test_safe_methods_are_open() {
        for perm in [
            Permission::ReadOnlyOrAuthenticated,
            Permission::AdminOrReadOnly,
            Permission::AuthorModeratorAdminOrReadOnly,
        ] {
            assert!(perm.check("GET", None, None).is_ok());
            assert!(perm.check("HEAD", None, None).is_ok());
        }
    }

    #[test]
    fn test_admin_only_rejects_reads_from_anonymous() {
        let result = Permission::AdminOrSuperuserOnly.check("GET", None, None);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_admin_only_rejects_plain_user() {
        let user = make_user(1, Role::User, false);
        let result = Permission::AdminOrSuperuserOnly.check("GET", Some(&user), None);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_admin_only_allows_superuser_with_user_role() {
        let user = make_user(1, Role::User, true);
        assert!(
            Permission::AdminOrSuperuserOnly
                .check("DELETE", Some(&user), None)
                .is_ok()
        );
    }

    #[test]
    fn test_admin_or_read_only_write_requires_admin() {
        let admin = make_user(1, Role::Admin, false);
        let moderator = make_user(2, Role::Moderator, false);

        assert!(
            Permission::AdminOrReadOnly
                .check("POST", Some(&admin), None)
                .is_ok()
        );
        assert!(matches!(
            Permission::AdminOrReadOnly.check("POST", Some(&moderator), None),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            Permission::AdminOrReadOnly.check("POST", None, None),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_author_policy_create_requires_authentication_only() {
        let user = make_user(7, Role::User, false);
        assert!(
            Permission::AuthorModeratorAdminOrReadOnly
                .check("POST", Some(&user), None)
                .is_ok()
        );
        assert!(matches!(
            Permission::AuthorModeratorAdminOrReadOnly.check("POST", None, None),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_author_policy_object_write() {
        let author = make_user(7, Role::User, false);
        let stranger = make_user(8, Role::User, false);
        let moderator = make_user(9, Role::Moderator, false);

        assert!(
            Permission::AuthorModeratorAdminOrReadOnly
                .check("PATCH", Some(&author), Some(7))
                .is_ok()
        );
        assert!(
            Permission::AuthorModeratorAdminOrReadOnly
                .check("DELETE", Some(&moderator), Some(7))
                .is_ok()
        );
        assert!(matches!(
            Permission::AuthorModeratorAdminOrReadOnly.check("PATCH", Some(&stranger), Some(7)),
            Err(AppError::Forbidden(_))
        ));
    }
}
