/// Database access facade
///
/// Every read and write in taskgate goes through the [`DatabaseAdapter`] trait.
/// Handlers never see a connection or a pool; they hand the facade a
/// [`Collection`], a list of [`Fields`] and get back [`Record`]s, which the
/// models decode into typed structs with [`decode`].
///
/// # Identifier safety
///
/// Table names come from the closed [`Collection`] enum and column names are
/// `&'static str` values checked against [`Collection::columns`]. Only values
/// ever travel as bound parameters, so nothing from a request body can end up
/// spliced into SQL.
///
/// # Implementations
///
/// - [`PostgresAdapter`](super::postgres::PostgresAdapter): sqlx over a `PgPool`
/// - [`MemoryAdapter`](super::memory::MemoryAdapter): in-process store with the
///   same semantics, used by the HTTP test suites
///
/// # Example
///
/// ```no_run
/// use taskgate_shared::db::adapter::{Collection, DatabaseAdapter, FieldValue, OrderBy};
/// use taskgate_shared::db::memory::MemoryAdapter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryAdapter::new();
///
/// let created = db
///     .insert(Collection::Tasks, vec![("title", FieldValue::from("Buy milk"))])
///     .await?;
///
/// let all = db.find_all(Collection::Tasks, OrderBy::default()).await?;
/// assert_eq!(all.len(), 1);
/// assert_eq!(created["title"], "Buy milk");
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// A single row, as a JSON object keyed by column name
pub type Record = Map<String, JsonValue>;

/// Column/value pairs for inserts and partial updates
pub type Fields = Vec<(&'static str, FieldValue)>;

/// Storage result type alias
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the facade
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A uniqueness (or other) constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Column is not part of the collection
    #[error("Unknown column '{column}' for collection '{collection}'")]
    UnknownColumn {
        collection: &'static str,
        column: String,
    },

    /// Row could not be turned into the requested type
    #[error("Failed to decode record: {0}")]
    Decode(String),

    /// The backend does not implement this operation
    #[error("Operation not supported by this adapter: {0}")]
    Unsupported(&'static str),

    /// Any other error from the underlying client
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StorageError::ConstraintViolation(constraint);
            }
        }

        StorageError::Database(err)
    }
}

/// Named set of records, one per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `users` table
    Users,

    /// `tasks` table
    Tasks,
}

impl Collection {
    /// Table backing this collection
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tasks => "tasks",
        }
    }

    /// Every column of the table, `id` first
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["id", "name", "email", "password_hash", "role", "created_at"],
            Collection::Tasks => &["id", "title", "description", "status", "created_at"],
        }
    }

    /// Columns carrying a UNIQUE constraint
    pub fn unique_columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["email"],
            Collection::Tasks => &[],
        }
    }

    /// Checks that `column` belongs to this collection
    pub fn ensure_column(&self, column: &str) -> StorageResult<()> {
        if self.columns().contains(&column) {
            Ok(())
        } else {
            Err(StorageError::UnknownColumn {
                collection: self.table(),
                column: column.to_string(),
            })
        }
    }

    /// Checks that every field targets a writable column (anything but `id`)
    pub fn ensure_writable(&self, fields: &Fields) -> StorageResult<()> {
        for (column, _) in fields {
            if *column == "id" {
                return Err(StorageError::UnknownColumn {
                    collection: self.table(),
                    column: column.to_string(),
                });
            }
            self.ensure_column(column)?;
        }
        Ok(())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// JSON form, as it appears in a [`Record`]
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::Integer(i) => JsonValue::from(*i),
            FieldValue::Boolean(b) => JsonValue::Bool(*b),
            FieldValue::Null => JsonValue::Null,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Sort direction for [`OrderBy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Ordering for [`DatabaseAdapter::find_all`]
///
/// Defaults to `id DESC` (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        OrderBy::desc("id")
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction.as_sql())
    }
}

/// Uniform CRUD contract over a relational store
///
/// Implementations must be cheap to share (`Arc<dyn DatabaseAdapter>`) and
/// must not add locking, retries or transactions on top of the client.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Runs a raw parameterized statement and returns its rows
    ///
    /// `sql` must use `$1..$n` placeholders for every value in `params`.
    async fn query(&self, sql: &str, params: Vec<FieldValue>) -> StorageResult<Vec<Record>>;

    /// Finds a record by primary key
    async fn find_by_id(&self, collection: Collection, id: i64) -> StorageResult<Option<Record>>;

    /// Finds the first record (lowest id) whose `column` equals `value`
    async fn find_one_by(
        &self,
        collection: Collection,
        column: &'static str,
        value: FieldValue,
    ) -> StorageResult<Option<Record>>;

    /// Lists every record in the collection
    async fn find_all(&self, collection: Collection, order: OrderBy) -> StorageResult<Vec<Record>>;

    /// Inserts a record and returns it with its server-assigned id
    ///
    /// # Errors
    ///
    /// [`StorageError::ConstraintViolation`] if a unique column collides.
    async fn insert(&self, collection: Collection, fields: Fields) -> StorageResult<Record>;

    /// Updates only the listed fields
    ///
    /// Returns `None` if no record has this id. An empty field list returns
    /// the current record unchanged.
    async fn update(
        &self,
        collection: Collection,
        id: i64,
        fields: Fields,
    ) -> StorageResult<Option<Record>>;

    /// Deletes a record, returning whether one existed
    async fn delete(&self, collection: Collection, id: i64) -> StorageResult<bool>;

    /// Cheap connectivity probe
    async fn health_check(&self) -> StorageResult<()> {
        self.query("SELECT 1 AS ok", Vec::new()).await.map(|_| ())
    }
}

/// Decodes a record into a model
pub fn decode<T: DeserializeOwned>(record: Record) -> StorageResult<T> {
    serde_json::from_value(JsonValue::Object(record)).map_err(|e| StorageError::Decode(e.to_string()))
}

/// Decodes every record, failing on the first bad one
pub fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> StorageResult<Vec<T>> {
    records.into_iter().map(decode).collect()
}
