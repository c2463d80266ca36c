/// Role-based authorization policies
///
/// Every protected route declares the set of roles it accepts. An
/// [`Authorizer`] compares the caller's [`Role`] with that set using one of
/// three policies chosen at startup.
///
/// # Policies
///
/// | Policy | Config name | Grants access when |
/// |--------|-------------|--------------------|
/// | [`AuthorizationPolicy::RoleBased`] | `role-based` | the role is listed |
/// | [`AuthorizationPolicy::Hierarchical`] | `hierarchical` | the role's level is at least the lowest listed level |
/// | [`AuthorizationPolicy::AdminOnly`] | `strict` | the role is admin and admin is listed |
///
/// Levels are `viewer = 1`, `manager = 2`, `admin = 3`. Under the admin-only
/// policy a route that does not list admin is closed to everyone, admins
/// included.
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::authorization::{AuthorizationPolicy, Authorizer};
/// use taskgate_shared::auth::principal::Principal;
/// use taskgate_shared::models::user::Role;
///
/// let authorizer = Authorizer::new(AuthorizationPolicy::Hierarchical);
/// let admin = Principal { id: 1, role: Role::Admin };
///
/// assert!(authorizer.authorize(Some(&admin), &[Role::Manager]).is_ok());
/// assert!(authorizer.authorize(None, &[Role::Viewer]).is_err());
/// ```

use std::fmt;
use std::str::FromStr;

use super::principal::Principal;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated caller on the request
    #[error("Usuário não autenticado")]
    Unauthenticated,

    /// Caller is authenticated but the policy denied access
    #[error("{0}")]
    Forbidden(&'static str),
}

/// How a caller's role is compared with a route's required roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorizationPolicy {
    /// Exact membership in the required set
    #[default]
    RoleBased,

    /// Privilege level comparison
    Hierarchical,

    /// Admins only, and only on routes that list admin
    AdminOnly,
}

impl AuthorizationPolicy {
    /// Decides whether `role` may access a resource requiring `required`
    pub fn can_access(&self, role: Role, required: &[Role]) -> bool {
        match self {
            AuthorizationPolicy::RoleBased => required.contains(&role),
            AuthorizationPolicy::Hierarchical => required
                .iter()
                .map(Role::level)
                .min()
                .is_some_and(|min_level| role.level() >= min_level),
            AuthorizationPolicy::AdminOnly => {
                role == Role::Admin && required.contains(&Role::Admin)
            }
        }
    }

    /// Message returned to the caller on denial
    pub fn denial_message(&self) -> &'static str {
        match self {
            AuthorizationPolicy::RoleBased => {
                "Permissão negada: você não tem o papel necessário para acessar este recurso"
            }
            AuthorizationPolicy::Hierarchical => {
                "Permissão negada: seu nível de acesso é insuficiente"
            }
            AuthorizationPolicy::AdminOnly => {
                "Permissão negada: apenas administradores podem acessar este recurso"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationPolicy::RoleBased => "role-based",
            AuthorizationPolicy::Hierarchical => "hierarchical",
            AuthorizationPolicy::AdminOnly => "strict",
        }
    }
}

impl fmt::Display for AuthorizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "role-based" | "exact" => Ok(AuthorizationPolicy::RoleBased),
            "hierarchical" => Ok(AuthorizationPolicy::Hierarchical),
            "strict" | "admin-only" => Ok(AuthorizationPolicy::AdminOnly),
            other => Err(format!(
                "Unknown authorization strategy '{}' (expected 'role-based', 'hierarchical' or 'strict')",
                other
            )),
        }
    }
}

/// Evaluates requests against the active policy
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    policy: AuthorizationPolicy,
}

impl Authorizer {
    pub fn new(policy: AuthorizationPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    pub fn policy(&self) -> AuthorizationPolicy {
        self.policy
    }

    /// Swaps the active policy
    pub fn set_policy(&mut self, policy: AuthorizationPolicy) {
        self.policy = policy;
    }

    /// Checks a caller against a route's required roles
    ///
    /// # Errors
    ///
    /// - [`AuthzError::Unauthenticated`] if there is no principal
    /// - [`AuthzError::Forbidden`] with the policy's message if access is denied
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        required: &[Role],
    ) -> Result<(), AuthzError> {
        let principal = principal.ok_or(AuthzError::Unauthenticated)?;

        if self.policy.can_access(principal.role, required) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden(self.policy.denial_message()))
        }
    }
}
