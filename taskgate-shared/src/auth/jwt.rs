/// JWT token generation and validation module
///
/// Tokens are signed with HS256 and carry the user's id and role, so a
/// protected request can be authorized without touching the database.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 2 hours by default, configurable per token
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskgate_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(7, Role::Manager);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.id, 7);
/// assert_eq!(validated.role, Role::Manager);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::Role;

/// Issuer written into and required from every token
pub const ISSUER: &str = "taskgate";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {}", ISSUER)]
    InvalidIssuer,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `iss`: Issuer (always "taskgate")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `id`: User id
/// - `role`: User role at the time the token was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: i64,

    /// User role
    pub role: Role,

    /// Issuer - Always "taskgate"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Default token lifetime
    pub fn default_expiration() -> Duration {
        Duration::hours(2)
    }

    /// Creates claims expiring after [`Claims::default_expiration`]
    pub fn new(user_id: i64, role: Role) -> Self {
        let now = Utc::now();
        Self::issued(user_id, role, now, now + Self::default_expiration())
    }

    /// Creates claims with a custom lifetime
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if the expiration falls outside the
    /// representable date range.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Duration;
    /// use taskgate_shared::auth::jwt::Claims;
    /// use taskgate_shared::models::user::Role;
    ///
    /// let claims = Claims::with_expiration(1, Role::Admin, Duration::minutes(30)).unwrap();
    /// assert!(!claims.is_expired());
    /// ```
    pub fn with_expiration(user_id: i64, role: Role, expires_in: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expiration = now.checked_add_signed(expires_in).ok_or_else(|| {
            JwtError::CreateError(format!("Token lifetime out of range: {}", expires_in))
        })?;

        Ok(Self::issued(user_id, role, now, expiration))
    }

    fn issued(user_id: i64, role: Role, now: DateTime<Utc>, expiration: DateTime<Utc>) -> Self {
        Self {
            id: user_id,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a compact JWT
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiration, not-before time and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` is in the past
/// - `JwtError::InvalidIssuer` if the token was not issued by taskgate
/// - `JwtError::ValidationError` for any other failure (bad signature, malformed token)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
