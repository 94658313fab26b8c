//! Dashboard summary.

use serde::Serialize;

use crate::db::{RepositoryError, Store};
use crate::models::CompanyUpdate;

/// Number of recent announcements shown on the dashboard.
pub const RECENT_UPDATES: i64 = 5;

/// Entity counts plus the latest announcements.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub tasks: i64,
    pub locations: i64,
    pub updates: i64,
    pub recent_updates: Vec<CompanyUpdate>,
}

pub struct DashboardService<'a> {
    store: &'a dyn Store,
}

impl<'a> DashboardService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if any count query fails.
    pub async fn summary(&self) -> Result<Dashboard, RepositoryError> {
        let (tasks, locations, updates, recent_updates) = tokio::try_join!(
            self.store.count_tasks(),
            self.store.count_locations(),
            self.store.count_updates(),
            self.store.list_updates(Some(RECENT_UPDATES)),
        )?;

        Ok(Dashboard {
            tasks,
            locations,
            updates,
            recent_updates,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, UpdateStore};
    use crate::models::NewCompanyUpdate;

    #[tokio::test]
    async fn test_summary_caps_recent_updates() {
        let store = MemoryStore::new();
        for i in 0..7 {
            store
                .create_update(NewCompanyUpdate {
                    title: format!("update {i}"),
                    description: "d".into(),
                    created_by: None,
                })
                .await
                .unwrap();
        }

        let summary = DashboardService::new(&store).summary().await.unwrap();
        assert_eq!(summary.updates, 7);
        assert_eq!(summary.tasks, 0);
        assert_eq!(summary.recent_updates.len(), 5);
        assert_eq!(summary.recent_updates[0].title, "update 6");
    }
}
