/// PostgreSQL implementation of the database facade
///
/// Rows are selected as `to_jsonb(t)` so every statement returns a single JSONB
/// column that maps straight onto a [`Record`]. Statements are assembled from
/// the collection's static identifiers only; values are always bound.
///
/// # Example
///
/// ```no_run
/// use taskgate_shared::db::adapter::{Collection, DatabaseAdapter};
/// use taskgate_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskgate_shared::db::postgres::PostgresAdapter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let db = PostgresAdapter::new(pool);
/// let task = db.find_by_id(Collection::Tasks, 1).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgPool, Postgres};
use sqlx::query::QueryScalar;
use tracing::debug;

use super::adapter::{
    Collection, DatabaseAdapter, FieldValue, Fields, OrderBy, Record, StorageError, StorageResult,
};

type JsonQuery<'q> = QueryScalar<'q, Postgres, JsonValue, PgArguments>;

/// Facade over a sqlx connection pool
#[derive(Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_records(&self, sql: &str, params: Vec<FieldValue>) -> StorageResult<Vec<Record>> {
        debug!(sql, params = params.len(), "Executing statement");

        let rows = bind_all(sqlx::query_scalar::<Postgres, JsonValue>(sql), params)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(into_record).collect()
    }

    async fn fetch_optional_record(
        &self,
        sql: &str,
        params: Vec<FieldValue>,
    ) -> StorageResult<Option<Record>> {
        debug!(sql, params = params.len(), "Executing statement");

        bind_all(sqlx::query_scalar::<Postgres, JsonValue>(sql), params)
            .fetch_optional(&self.pool)
            .await?
            .map(into_record)
            .transpose()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn query(&self, sql: &str, params: Vec<FieldValue>) -> StorageResult<Vec<Record>> {
        self.fetch_records(&wrap_query_sql(sql), params).await
    }

    async fn find_by_id(&self, collection: Collection, id: i64) -> StorageResult<Option<Record>> {
        self.fetch_optional_record(&select_by_id_sql(collection), vec![FieldValue::Integer(id)])
            .await
    }

    async fn find_one_by(
        &self,
        collection: Collection,
        column: &'static str,
        value: FieldValue,
    ) -> StorageResult<Option<Record>> {
        collection.ensure_column(column)?;
        self.fetch_optional_record(&select_by_column_sql(collection, column), vec![value])
            .await
    }

    async fn find_all(&self, collection: Collection, order: OrderBy) -> StorageResult<Vec<Record>> {
        collection.ensure_column(order.column)?;
        self.fetch_records(&select_all_sql(collection, order), Vec::new())
            .await
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> StorageResult<Record> {
        collection.ensure_writable(&fields)?;

        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        let values: Vec<FieldValue> = fields.into_iter().map(|(_, value)| value).collect();

        self.fetch_optional_record(&insert_sql(collection, &columns), values)
            .await?
            .ok_or_else(|| StorageError::Decode("INSERT returned no row".to_string()))
    }

    async fn update(
        &self,
        collection: Collection,
        id: i64,
        fields: Fields,
    ) -> StorageResult<Option<Record>> {
        if fields.is_empty() {
            return self.find_by_id(collection, id).await;
        }
        collection.ensure_writable(&fields)?;

        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        let mut values: Vec<FieldValue> = fields.into_iter().map(|(_, value)| value).collect();
        values.push(FieldValue::Integer(id));

        self.fetch_optional_record(&update_sql(collection, &columns), values)
            .await
    }

    async fn delete(&self, collection: Collection, id: i64) -> StorageResult<bool> {
        let result = sqlx::query(&delete_sql(collection))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> StorageResult<()> {
        super::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

fn bind_all(mut query: JsonQuery<'_>, params: Vec<FieldValue>) -> JsonQuery<'_> {
    for param in params {
        query = match param {
            FieldValue::Text(value) => query.bind(value),
            FieldValue::Integer(value) => query.bind(value),
            FieldValue::Boolean(value) => query.bind(value),
            FieldValue::Null => query.bind(None::<String>),
        };
    }
    query
}

fn into_record(value: JsonValue) -> StorageResult<Record> {
    match value {
        JsonValue::Object(record) => Ok(record),
        other => Err(StorageError::Decode(format!("expected a JSON object, got {}", other))),
    }
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("${}", index))
        .collect::<Vec<_>>()
        .join(", ")
}

fn wrap_query_sql(sql: &str) -> String {
    format!("WITH q AS ({}) SELECT to_jsonb(q) AS record FROM q", sql)
}

fn select_by_id_sql(collection: Collection) -> String {
    format!(
        "SELECT to_jsonb(t) AS record FROM {} t WHERE t.id = $1",
        collection.table()
    )
}

fn select_by_column_sql(collection: Collection, column: &str) -> String {
    format!(
        "SELECT to_jsonb(t) AS record FROM {} t WHERE t.{} = $1 ORDER BY t.id ASC LIMIT 1",
        collection.table(),
        column
    )
}

fn select_all_sql(collection: Collection, order: OrderBy) -> String {
    format!(
        "SELECT to_jsonb(t) AS record FROM {} t ORDER BY t.{} {}",
        collection.table(),
        order.column,
        order.direction.as_sql()
    )
}

fn insert_sql(collection: Collection, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!(
            "INSERT INTO {} AS t DEFAULT VALUES RETURNING to_jsonb(t) AS record",
            collection.table()
        );
    }

    format!(
        "INSERT INTO {} AS t ({}) VALUES ({}) RETURNING to_jsonb(t) AS record",
        collection.table(),
        columns.join(", "),
        placeholders(columns.len())
    )
}

fn update_sql(collection: Collection, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{} = ${}", column, index + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} AS t SET {} WHERE t.id = ${} RETURNING to_jsonb(t) AS record",
        collection.table(),
        assignments,
        columns.len() + 1
    )
}

fn delete_sql(collection: Collection) -> String {
    format!("DELETE FROM {} WHERE id = $1", collection.table())
}
