/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`principal`]: bearer header parsing into an authenticated [`Principal`](principal::Principal)
/// - [`authorization`]: role policies and the [`Authorizer`](authorization::Authorizer)
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::authorization::{AuthorizationPolicy, Authorizer};
/// use taskgate_shared::auth::jwt::{create_token, Claims};
/// use taskgate_shared::auth::principal::authenticate_bearer;
/// use taskgate_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let token = create_token(&Claims::new(1, Role::Manager), secret)?;
///
/// let principal = authenticate_bearer(Some(&format!("Bearer {}", token)), secret)?;
/// Authorizer::new(AuthorizationPolicy::RoleBased)
///     .authorize(Some(&principal), &[Role::Admin, Role::Manager])?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod password;
pub mod principal;
