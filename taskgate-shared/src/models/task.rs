/// Task model and database operations
///
/// Tasks are plain to-do items. All persistence goes through the
/// [`DatabaseAdapter`] facade, so the same code runs against PostgreSQL and
/// the in-memory store.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     status VARCHAR(20) NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskgate_shared::db::memory::MemoryAdapter;
/// use taskgate_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryAdapter::new();
///
/// let task = Task::create(&db, CreateTask {
///     title: "Buy milk".to_string(),
///     description: None,
///     status: TaskStatus::Pending,
/// })
/// .await?;
///
/// let done = UpdateTask {
///     status: Some(TaskStatus::Done),
///     ..Default::default()
/// };
/// Task::update(&db, task.id, done).await?;
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

/// Task status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not done yet (default for new tasks)
    #[default]
    Pending,

    /// Completed
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

impl From<TaskStatus> for FieldValue {
    fn from(status: TaskStatus) -> Self {
        FieldValue::Text(status.as_str().to_string())
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id
    pub id: i64,

    /// Title (1..200 characters once validated)
    pub title: String,

    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

impl CreateTask {
    fn into_fields(self) -> Fields {
        vec![
            ("title", FieldValue::from(self.title)),
            ("description", FieldValue::from(self.description)),
            ("status", FieldValue::from(self.status)),
        ]
    }
}

/// Input for a partial update
///
/// Only `Some` fields are written; everything else keeps its stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        if let Some(title) = self.title {
            fields.push(("title", FieldValue::from(title)));
        }
        if let Some(description) = self.description {
            fields.push(("description", FieldValue::from(description)));
        }
        if let Some(status) = self.status {
            fields.push(("status", FieldValue::from(status)));
        }
        fields
    }
}

impl Task {
    /// Inserts a new task and returns it with its id and timestamp
    pub async fn create(db: &dyn DatabaseAdapter, data: CreateTask) -> StorageResult<Self> {
        let record = db.insert(Collection::Tasks, data.into_fields()).await?;
        decode(record)
    }

    /// Finds a task by id
    pub async fn find_by_id(db: &dyn DatabaseAdapter, id: i64) -> StorageResult<Option<Self>> {
        db.find_by_id(Collection::Tasks, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Lists all tasks, newest first
    pub async fn list(db: &dyn DatabaseAdapter) -> StorageResult<Vec<Self>> {
        let records = db.find_all(Collection::Tasks, OrderBy::desc("id")).await?;
        decode_all(records)
    }

    /// Applies a partial update
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update(
        db: &dyn DatabaseAdapter,
        id: i64,
        data: UpdateTask,
    ) -> StorageResult<Option<Self>> {
        db.update(Collection::Tasks, id, data.into_fields())
            .await?
            .map(decode)
            .transpose()
    }

    /// Deletes a task, returning whether it existed
    pub async fn delete(db: &dyn DatabaseAdapter, id: i64) -> StorageResult<bool> {
        db.delete(Collection::Tasks, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryAdapter;

    fn new_task(title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            status: TaskStatus::default(),
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_update_task_fields() {
        let update = UpdateTask {
            title: Some("X".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(update.into_fields(), vec![("title", FieldValue::from("X"))]);
        assert!(UpdateTask::default().is_empty());
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let db = MemoryAdapter::new();

        let task = Task::create(&db, new_task("Buy milk")).await.unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, None);
        assert_eq!(task.status, TaskStatus::Pending);

        let found = Task::find_by_id(&db, task.id).await.unwrap();
        assert_eq!(found, Some(task));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let db = MemoryAdapter::new();
        Task::create(&db, new_task("first")).await.unwrap();
        Task::create(&db, new_task("second")).await.unwrap();

        let titles: Vec<String> = Task::list(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = MemoryAdapter::new();
        let task = Task::create(
            &db,
            CreateTask {
                title: "Original".to_string(),
                description: Some("keep me".to_string()),
                status: TaskStatus::Pending,
            },
        )
        .await
        .unwrap();

        let update = UpdateTask {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let updated = Task::update(&db, task.id, update).await.unwrap().unwrap();

        assert_eq!(updated.title, "Original");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = MemoryAdapter::new();

        assert!(Task::update(&db, 42, UpdateTask::default()).await.unwrap().is_none());
        assert!(!Task::delete(&db, 42).await.unwrap());
    }
}
