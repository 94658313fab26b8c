//! Task queries.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use taskie_core::{TaskId, TaskStatus, UserId};

use super::{PgStore, expect_one_row};
use crate::db::{RepositoryError, TaskStore};
use crate::models::{NewTask, Task, TaskPatch};

const TASK_COLUMNS: &str = "id, name, status, due_date, created_by, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i32,
    name: String,
    status: TaskStatus,
    due_date: NaiveDate,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::new(row.id),
            name: row.name,
            status: row.status,
            due_date: row.due_date,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "INSERT INTO tasks (name, status, due_date, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING {TASK_COLUMNS}"
        ))
        .bind(&task.name)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, RepositoryError> {
        if patch.is_empty() {
            return self.find_task(id).await?.ok_or(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE tasks SET \
                 name = COALESCE($2, name), \
                 status = COALESCE($3, status), \
                 due_date = COALESCE($4, due_date), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.status)
        .bind(patch.due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn count_tasks(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
