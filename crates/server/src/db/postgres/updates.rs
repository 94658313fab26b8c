//! Company update queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use taskie_core::{UpdateId, UserId};

use super::{PgStore, expect_one_row};
use crate::db::{RepositoryError, UpdateStore};
use crate::models::{CompanyUpdate, NewCompanyUpdate};

const UPDATE_COLUMNS: &str = "id, title, description, created_by, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CompanyUpdateRow {
    id: i32,
    title: String,
    description: String,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<CompanyUpdateRow> for CompanyUpdate {
    fn from(row: CompanyUpdateRow) -> Self {
        Self {
            id: UpdateId::new(row.id),
            title: row.title,
            description: row.description,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UpdateStore for PgStore {
    async fn create_update(
        &self,
        update: NewCompanyUpdate,
    ) -> Result<CompanyUpdate, RepositoryError> {
        let row = sqlx::query_as::<_, CompanyUpdateRow>(&format!(
            "INSERT INTO company_updates (title, description, created_by) \
             VALUES ($1, $2, $3) RETURNING {UPDATE_COLUMNS}"
        ))
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_updates(&self, limit: Option<i64>) -> Result<Vec<CompanyUpdate>, RepositoryError> {
        // LIMIT NULL means no limit.
        let rows = sqlx::query_as::<_, CompanyUpdateRow>(&format!(
            "SELECT {UPDATE_COLUMNS} FROM company_updates \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_update(&self, id: UpdateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM company_updates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn count_updates(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM company_updates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
