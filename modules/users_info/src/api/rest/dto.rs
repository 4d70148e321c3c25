use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{NewUser, User, UserUpdate};

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    #[schema(format = "date-time")]
    pub created_on_utc: DateTime<Utc>,
}

/// REST DTO for creating a new user.
///
/// Fields are optional at the wire level so that a missing field surfaces as
/// a validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[schema(min_length = 2, max_length = 50)]
    pub first_name: Option<String>,
    #[schema(min_length = 2, max_length = 50)]
    pub last_name: Option<String>,
    #[schema(max_length = 120, format = "email")]
    pub email: Option<String>,
}

/// REST DTO for replacing a user's mutable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    #[schema(min_length = 2, max_length = 50)]
    pub first_name: Option<String>,
    #[schema(min_length = 2, max_length = 50)]
    pub last_name: Option<String>,
    #[schema(max_length = 120, format = "email")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Single error body: `{ "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Validation error body: `{ "errors": ["...", ...] }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorListBody {
    pub errors: Vec<String>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_active: user.is_active,
            created_on_utc: user.created_on_utc,
        }
    }
}

// Only called after validation, so the fields are present.
impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
        }
    }
}

impl From<UpdateUserReq> for UserUpdate {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            is_active: req.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn user_dto_uses_camel_case_wire_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let dto = UserDto::from(User {
            id: 7,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            is_active: true,
            created_on_utc: at,
        });

        let v = serde_json::to_value(&dto).unwrap();
        assert_eq!(v["id"], 7);
        assert_eq!(v["firstName"], "Ada");
        assert_eq!(v["lastName"], "Lovelace");
        assert_eq!(v["email"], "ada@example.com");
        assert_eq!(v["isActive"], true);
        assert_eq!(v["createdOnUtc"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn update_request_defaults_is_active_to_false() {
        let req: UpdateUserReq = serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com"
        }))
        .unwrap();
        assert!(!req.is_active);

        let update = UserUpdate::from(req);
        assert_eq!(update.first_name, "Ada");
        assert!(!update.is_active);
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateUserReq =
            serde_json::from_value(serde_json::json!({ "firstName": "Ada" })).unwrap();
        assert_eq!(req.first_name.as_deref(), Some("Ada"));
        assert!(req.last_name.is_none());
        assert!(req.email.is_none());
    }
}
