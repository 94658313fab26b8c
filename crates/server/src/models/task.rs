//! Task model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use taskie_core::{TaskId, TaskStatus, UserId};

use super::{ValidationError, optional_text, required_text};

/// A unit of work with a status and due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub created_by: Option<UserId>,
}

/// Validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

impl TaskPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.due_date.is_none()
    }

    /// Apply the patch in place.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Body of `POST /createTask`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub name: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

impl CreateTaskRequest {
    /// Validate the payload, attributing the task to `created_by`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the first invalid field.
    pub fn validate(self, created_by: Option<UserId>) -> Result<NewTask, ValidationError> {
        let name = required_text("name", self.name)?;
        let status = parse_status(self.status)?.unwrap_or_default();
        let due_date = parse_due_date(self.due_date)?
            .ok_or_else(|| ValidationError::required("due_date"))?;
        Ok(NewTask {
            name,
            status,
            due_date,
            created_by,
        })
    }
}

/// Body of `PUT /admin/updateTask`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(rename = "taskId")]
    pub task_id: Option<TaskId>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

impl UpdateTaskRequest {
    /// Validate the carried fields and return the target id with its patch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `taskId` is missing or a carried field is invalid.
    pub fn validate(self) -> Result<(TaskId, TaskPatch), ValidationError> {
        let id = self.task_id.ok_or_else(|| ValidationError::required("taskId"))?;
        let patch = TaskPatch {
            name: optional_text("name", self.name)?,
            status: parse_status(self.status)?,
            due_date: parse_due_date(self.due_date)?,
        };
        Ok((id, patch))
    }
}

fn parse_status(raw: Option<String>) -> Result<Option<TaskStatus>, ValidationError> {
    raw.map(|s| {
        s.trim()
            .parse::<TaskStatus>()
            .map_err(|e| ValidationError::new("status", e))
    })
    .transpose()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date.
fn parse_due_date(raw: Option<String>) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| {
            ValidationError::new(
                "due_date",
                "due_date must be a YYYY-MM-DD date or RFC 3339 timestamp",
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(name: &str, status: Option<&str>, due: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            name: Some(name.to_owned()),
            status: status.map(String::from),
            due_date: Some(due.to_owned()),
        }
    }

    #[test]
    fn test_create_defaults_to_pending() {
        let task = request("Inventory", None, "2024-07-01")
            .validate(Some(UserId::new(3)))
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(task.created_by, Some(UserId::new(3)));
    }

    #[test]
    fn test_create_accepts_rfc3339_due_date() {
        let task = request("Audit", Some("in-progress"), "2024-07-01T09:30:00Z")
            .validate(None)
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_create_rejects_bad_fields() {
        let err = request("", None, "2024-07-01").validate(None).unwrap_err();
        assert_eq!(err.field, "name");

        let err = request("x", Some("done"), "2024-07-01")
            .validate(None)
            .unwrap_err();
        assert_eq!(err.field, "status");

        let err = request("x", None, "next tuesday").validate(None).unwrap_err();
        assert_eq!(err.field, "due_date");

        let err = CreateTaskRequest {
            name: Some("x".into()),
            ..Default::default()
        }
        .validate(None)
        .unwrap_err();
        assert_eq!(err, ValidationError::required("due_date"));
    }

    #[test]
    fn test_update_request_wire_format() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"taskId": 9, "status": "completed"}"#).unwrap();
        let (id, patch) = req.validate().unwrap();
        assert_eq!(id, TaskId::new(9));
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_update_request_requires_id() {
        let err = UpdateTaskRequest::default().validate().unwrap_err();
        assert_eq!(err.field, "taskId");
    }

    #[test]
    fn test_patch_apply() {
        let mut task = Task {
            id: TaskId::new(1),
            name: "Old".into(),
            status: TaskStatus::Pending,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let empty = TaskPatch::default();
        assert!(empty.is_empty());
        empty.apply_to(&mut task);
        assert_eq!(task.name, "Old");

        TaskPatch {
            name: Some("New".into()),
            ..Default::default()
        }
        .apply_to(&mut task);
        assert_eq!(task.name, "New");
        assert_eq!(task.status, TaskStatus::Pending);
    }
}
