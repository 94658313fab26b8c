//! Company announcement model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskie_core::{UpdateId, UserId};

use super::{ValidationError, required_text};

/// An announcement posted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyUpdate {
    pub id: UpdateId,
    pub title: String,
    pub description: String,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompanyUpdate {
    pub title: String,
    pub description: String,
    pub created_by: Option<UserId>,
}

/// Body of `POST /addUpdate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CreateUpdateRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` if `title` or `description` is missing or blank.
    pub fn validate(self, created_by: Option<UserId>) -> Result<NewCompanyUpdate, ValidationError> {
        Ok(NewCompanyUpdate {
            title: required_text("title", self.title)?,
            description: required_text("description", self.description)?,
            created_by,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let update = CreateUpdateRequest {
            title: Some("Q3".into()),
            description: Some("meeting".into()),
        }
        .validate(Some(UserId::new(1)))
        .unwrap();
        assert_eq!(update.title, "Q3");

        let err = CreateUpdateRequest {
            title: Some("Q3".into()),
            description: Some(" ".into()),
        }
        .validate(None)
        .unwrap_err();
        assert_eq!(err.field, "description");
    }
}
