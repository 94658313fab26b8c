//! Location queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use taskie_core::{LocationId, UserId};

use super::{PgStore, expect_one_row};
use crate::db::{LocationStore, RepositoryError};
use crate::models::{Location, LocationPatch, NewLocation};

const LOCATION_COLUMNS: &str = "id, name, address, capacity, created_by, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: i32,
    name: String,
    address: String,
    capacity: i32,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: LocationId::new(row.id),
            name: row.name,
            address: row.address,
            capacity: row.capacity,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl LocationStore for PgStore {
    async fn create_location(&self, location: NewLocation) -> Result<Location, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "INSERT INTO locations (name, address, capacity, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(&location.name)
        .bind(&location.address)
        .bind(location.capacity)
        .bind(location.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, RepositoryError> {
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_location(&self, id: LocationId) -> Result<Option<Location>, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_location(
        &self,
        id: LocationId,
        patch: LocationPatch,
    ) -> Result<Location, RepositoryError> {
        if patch.is_empty() {
            return self
                .find_location(id)
                .await?
                .ok_or(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "UPDATE locations SET \
                 name = COALESCE($2, name), \
                 address = COALESCE($3, address), \
                 capacity = COALESCE($4, capacity), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.address)
        .bind(patch.capacity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_location(&self, id: LocationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn count_locations(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM locations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
