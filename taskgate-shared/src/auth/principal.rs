/// Bearer token authentication
///
/// Turns the raw `Authorization` header value into a [`Principal`]. The HTTP
/// layer calls [`authenticate_bearer`] once per protected request and stores
/// the result in the request extensions.
///
/// # Failure modes
///
/// | Situation | Error |
/// |-----------|-------|
/// | no header | [`AuthError::MissingCredentials`] |
/// | not `Bearer <token>` | [`AuthError::InvalidFormat`] |
/// | bad signature, expired, wrong issuer | [`AuthError::InvalidToken`] |
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::jwt::{create_token, Claims};
/// use taskgate_shared::auth::principal::authenticate_bearer;
/// use taskgate_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let token = create_token(&Claims::new(3, Role::Viewer), secret)?;
///
/// let header = format!("Bearer {}", token);
/// let principal = authenticate_bearer(Some(&header), secret)?;
/// assert_eq!(principal.id, 3);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::jwt::{validate_token, Claims};
use crate::models::user::Role;

/// Authenticated caller, valid for the lifetime of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User id from the token
    pub id: i64,

    /// Role from the token
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
        }
    }
}

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header at all
    #[error("Token ausente")]
    MissingCredentials,

    /// Header present but no bearer token in it
    #[error("Token inválido")]
    InvalidFormat,

    /// Token failed verification
    #[error("Token inválido ou expirado")]
    InvalidToken,
}

/// Authenticates an `Authorization` header value
pub fn authenticate_bearer(header: Option<&str>, secret: &str) -> Result<Principal, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => return Err(AuthError::InvalidFormat),
    };
    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    let claims = validate_token(token, secret).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        AuthError::InvalidToken
    })?;

    Ok(Principal::from(claims))
}
