//! Location model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use taskie_core::{LocationId, UserId};

use super::{ValidationError, optional_text, required_text};

/// A physical site with a headcount capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub created_by: Option<UserId>,
}

/// Validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,
}

impl LocationPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.capacity.is_none()
    }

    /// Apply the patch in place.
    pub fn apply_to(self, location: &mut Location) {
        if let Some(name) = self.name {
            location.name = name;
        }
        if let Some(address) = self.address {
            location.address = address;
        }
        if let Some(capacity) = self.capacity {
            location.capacity = capacity;
        }
    }
}

/// Body of `POST /createLocation`.
///
/// `capacity` is kept as raw JSON so numeric strings from HTML forms are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLocationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<Value>,
}

impl CreateLocationRequest {
    /// Validate the payload, attributing the location to `created_by`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the first invalid field.
    pub fn validate(self, created_by: Option<UserId>) -> Result<NewLocation, ValidationError> {
        let name = required_text("name", self.name)?;
        let address = required_text("address", self.address)?;
        let capacity =
            parse_capacity(self.capacity)?.ok_or_else(|| ValidationError::required("capacity"))?;
        Ok(NewLocation {
            name,
            address,
            capacity,
            created_by,
        })
    }
}

/// Body of `PUT /admin/updateLocation`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(rename = "locationId")]
    pub location_id: Option<LocationId>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<Value>,
}

impl UpdateLocationRequest {
    /// Validate the carried fields and return the target id with its patch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `locationId` is missing or a carried field is invalid.
    pub fn validate(self) -> Result<(LocationId, LocationPatch), ValidationError> {
        let id = self
            .location_id
            .ok_or_else(|| ValidationError::required("locationId"))?;
        let patch = LocationPatch {
            name: optional_text("name", self.name)?,
            address: optional_text("address", self.address)?,
            capacity: parse_capacity(self.capacity)?,
        };
        Ok((id, patch))
    }
}

fn parse_capacity(raw: Option<Value>) -> Result<Option<i32>, ValidationError> {
    let invalid = || ValidationError::new("capacity", "capacity must be a non-negative integer");
    let parsed = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    parsed
        .filter(|n| *n >= 0)
        .and_then(|n| i32::try_from(n).ok())
        .map(Some)
        .ok_or_else(invalid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(capacity: Value) -> CreateLocationRequest {
        CreateLocationRequest {
            name: Some("Warehouse".into()),
            address: Some("1 Dock Rd".into()),
            capacity: Some(capacity),
        }
    }

    #[test]
    fn test_capacity_accepts_numbers_and_numeric_strings() {
        assert_eq!(request(json!(40)).validate(None).unwrap().capacity, 40);
        assert_eq!(request(json!(" 12 ")).validate(None).unwrap().capacity, 12);
        assert_eq!(request(json!(0)).validate(None).unwrap().capacity, 0);
    }

    #[test]
    fn test_capacity_rejects_invalid() {
        for bad in [json!(-1), json!(2.5), json!("lots"), json!(true), json!(i64::MAX)] {
            let err = request(bad.clone()).validate(None).unwrap_err();
            assert_eq!(err.field, "capacity", "{bad} should be rejected");
        }
    }

    #[test]
    fn test_create_requires_address() {
        let err = CreateLocationRequest {
            name: Some("HQ".into()),
            address: None,
            capacity: Some(json!(5)),
        }
        .validate(None)
        .unwrap_err();
        assert_eq!(err, ValidationError::required("address"));
    }

    #[test]
    fn test_update_request_wire_format() {
        let req: UpdateLocationRequest =
            serde_json::from_str(r#"{"locationId": 2, "capacity": "80"}"#).unwrap();
        let (id, patch) = req.validate().unwrap();
        assert_eq!(id, LocationId::new(2));
        assert_eq!(patch.capacity, Some(80));
        assert!(patch.address.is_none());
    }

    #[test]
    fn test_empty_patch() {
        let req: UpdateLocationRequest = serde_json::from_str(r#"{"locationId": 2}"#).unwrap();
        let (_, patch) = req.validate().unwrap();
        assert!(patch.is_empty());
    }
}
