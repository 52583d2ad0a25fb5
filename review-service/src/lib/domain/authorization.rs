//! Role and permission checks for protected actions.
//!
//! The gate is a pair of pure predicates over an [`Actor`]. Verifying the
//! access token and loading the actor happen before, in the
//! authentication service.

use crate::domain::authentication::errors::AuthError;
use crate::domain::user::models::Permission;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// The verified caller of a request, with role and permissions as
/// currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            permissions: user.permissions.clone(),
        }
    }
}

/// Allow when the actor has `role`. Administrators are always allowed.
pub fn require_role(actor: &Actor, role: Role) -> Result<(), AuthError> {
    if actor.is_admin() || actor.role == role {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.id, required = %role, "Role check denied");
        Err(AuthError::Forbidden)
    }
}

/// Allow when the actor owns the resource and holds `permission`.
/// Administrators are always allowed.
pub fn require_permission(
    actor: &Actor,
    permission: Permission,
    resource_owner: &UserId,
) -> Result<(), AuthError> {
    if actor.is_admin()
        || (actor.id == *resource_owner && actor.permissions.contains(&permission))
    {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %actor.id,
            owner = %resource_owner,
            required = %permission,
            "Permission check denied"
        );
        Err(AuthError::Forbidden)
    }
}
