/// In-memory implementation of the database facade
///
/// Keeps one ordered map per collection behind a tokio `RwLock`. It mirrors the
/// PostgreSQL schema closely enough for the HTTP layer not to notice:
///
/// - ids come from a per-collection sequence starting at 1 and are never reused
/// - unique columns are enforced and reported as
///   [`StorageError::ConstraintViolation`] with Postgres-style constraint names
/// - column defaults (`status`, `role`, `created_at`) are filled on insert
///
/// Raw SQL is not interpreted, so [`DatabaseAdapter::query`] returns
/// [`StorageError::Unsupported`].
///
/// # Example
///
/// ```
/// use taskgate_shared::db::adapter::{Collection, DatabaseAdapter, FieldValue};
/// use taskgate_shared::db::memory::MemoryAdapter;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryAdapter::new();
/// let record = db
///     .insert(Collection::Tasks, vec![("title", FieldValue::from("Write docs"))])
///     .await?;
///
/// assert_eq!(record["id"], 1);
/// assert_eq!(record["status"], "pending");
/// assert!(db.delete(Collection::Tasks, 1).await?);
/// assert!(!db.delete(Collection::Tasks, 1).await?);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::adapter::{
    Collection, DatabaseAdapter, FieldValue, Fields, OrderBy, Record, SortDirection, StorageError,
    StorageResult,
};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Record>,
    last_id: i64,
}

/// Facade backed by process memory
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    tables: RwLock<HashMap<Collection, Table>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn column_default(collection: Collection, column: &str) -> JsonValue {
    match (collection, column) {
        (_, "created_at") => JsonValue::String(Utc::now().to_rfc3339()),
        (Collection::Tasks, "status") => JsonValue::String("pending".to_string()),
        (Collection::Users, "role") => JsonValue::String("viewer".to_string()),
        _ => JsonValue::Null,
    }
}

fn check_unique(
    collection: Collection,
    table: &Table,
    fields: &Fields,
    own_id: Option<i64>,
) -> StorageResult<()> {
    for (column, value) in fields {
        if !collection.unique_columns().contains(column) {
            continue;
        }

        let candidate = value.to_json();
        let taken = table
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != own_id && row.get(*column) == Some(&candidate));

        if taken {
            return Err(StorageError::ConstraintViolation(format!(
                "{}_{}_key",
                collection.table(),
                column
            )));
        }
    }
    Ok(())
}

fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (None | Some(JsonValue::Null), None | Some(JsonValue::Null)) => Ordering::Equal,
        // NULLS LAST, like Postgres ascending order
        (None | Some(JsonValue::Null), _) => Ordering::Greater,
        (_, None | Some(JsonValue::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DatabaseAdapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, _sql: &str, _params: Vec<FieldValue>) -> StorageResult<Vec<Record>> {
        Err(StorageError::Unsupported("raw SQL queries"))
    }

    async fn find_by_id(&self, collection: Collection, id: i64) -> StorageResult<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .and_then(|table| table.rows.get(&id))
            .cloned())
    }

    async fn find_one_by(
        &self,
        collection: Collection,
        column: &'static str,
        value: FieldValue,
    ) -> StorageResult<Option<Record>> {
        collection.ensure_column(column)?;

        let wanted = value.to_json();
        let tables = self.tables.read().await;
        Ok(tables.get(&collection).and_then(|table| {
            table
                .rows
                .values()
                .find(|row| row.get(column) == Some(&wanted))
                .cloned()
        }))
    }

    async fn find_all(&self, collection: Collection, order: OrderBy) -> StorageResult<Vec<Record>> {
        collection.ensure_column(order.column)?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Record> = tables
            .get(&collection)
            .map(|table| table.rows.values().cloned().collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            let ordering = compare_values(a.get(order.column), b.get(order.column));
            match order.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Ok(rows)
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> StorageResult<Record> {
        collection.ensure_writable(&fields)?;

        let mut tables = self.tables.write().await;
        let table = tables.entry(collection).or_default();
        check_unique(collection, table, &fields, None)?;

        let id = table.last_id + 1;
        let mut record = Record::new();
        for column in collection.columns() {
            let value = match fields.iter().find(|(name, _)| name == column) {
                Some((_, value)) => value.to_json(),
                None if *column == "id" => JsonValue::from(id),
                None => column_default(collection, column),
            };
            record.insert(column.to_string(), value);
        }

        table.last_id = id;
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        id: i64,
        fields: Fields,
    ) -> StorageResult<Option<Record>> {
        collection.ensure_writable(&fields)?;

        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(&collection) else {
            return Ok(None);
        };
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        check_unique(collection, table, &fields, Some(id))?;

        let Some(record) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        for (column, value) in fields {
            record.insert(column.to_string(), value.to_json());
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, collection: Collection, id: i64) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(&collection)
            .map(|table| table.rows.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
