/// User model and database operations
///
/// Users carry a [`Role`] that drives authorization. Passwords are stored as
/// Argon2id hashes, never in plaintext, and the model is never serialized
/// straight into an HTTP response.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(20) NOT NULL DEFAULT 'viewer',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskgate_shared::db::memory::MemoryAdapter;
/// use taskgate_shared::models::user::{CreateUser, Role, User};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryAdapter::new();
///
/// let user = User::create(&db, CreateUser {
///     name: "Ana".to_string(),
///     email: "ana@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Manager,
/// })
/// .await?;
///
/// let found = User::find_by_email(&db, "ana@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::adapter::{
    decode, decode_all, Collection, DatabaseAdapter, FieldValue, Fields, OrderBy, StorageResult,
};

/// Access role
///
/// Ordered by privilege: `Viewer < Manager < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Viewer,
}

impl Role {
    /// Every role, most privileged first
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Viewer];

    /// Privilege level used by the hierarchical policy
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Manager => 2,
            Role::Viewer => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "viewer" => Ok(Role::Viewer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl From<Role> for FieldValue {
    fn from(role: Role) -> Self {
        FieldValue::Text(role.as_str().to_string())
    }
}

/// User model representing an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Access role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub role: Role,
}

impl CreateUser {
    fn into_fields(self) -> Fields {
        vec![
            ("name", FieldValue::from(self.name)),
            ("email", FieldValue::from(self.email)),
            ("password_hash", FieldValue::from(self.password_hash)),
            ("role", FieldValue::from(self.role)),
        ]
    }
}

/// Input for updating a user
///
/// Only name and password can change after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl UpdateUser {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        if let Some(name) = self.name {
            fields.push(("name", FieldValue::from(name)));
        }
        if let Some(password_hash) = self.password_hash {
            fields.push(("password_hash", FieldValue::from(password_hash)));
        }
        fields
    }
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// [`StorageError::ConstraintViolation`](crate::db::adapter::StorageError::ConstraintViolation)
    /// if the email is already taken.
    pub async fn create(db: &dyn DatabaseAdapter, data: CreateUser) -> StorageResult<Self> {
        let record = db.insert(Collection::Users, data.into_fields()).await?;
        decode(record)
    }

    /// Finds a user by id
    pub async fn find_by_id(db: &dyn DatabaseAdapter, id: i64) -> StorageResult<Option<Self>> {
        db.find_by_id(Collection::Users, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Finds a user by email (exact match)
    pub async fn find_by_email(
        db: &dyn DatabaseAdapter,
        email: &str,
    ) -> StorageResult<Option<Self>> {
        db.find_one_by(Collection::Users, "email", FieldValue::from(email))
            .await?
            .map(decode)
            .transpose()
    }

    /// Lists all users in id order
    pub async fn list(db: &dyn DatabaseAdapter) -> StorageResult<Vec<Self>> {
        let records = db.find_all(Collection::Users, OrderBy::asc("id")).await?;
        decode_all(records)
    }

    /// Updates name and/or password hash
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update(
        db: &dyn DatabaseAdapter,
        id: i64,
        data: UpdateUser,
    ) -> StorageResult<Option<Self>> {
        db.update(Collection::Users, id, data.into_fields())
            .await?
            .map(decode)
            .transpose()
    }

    /// Deletes a user, returning whether it existed
    pub async fn delete(db: &dyn DatabaseAdapter, id: i64) -> StorageResult<bool> {
        db.delete(Collection::Users, id).await
    }
}
