use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::access::catalogue::action_name;
use crate::features::access::models::{Role, Rule};

/// Response DTO for role
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleResponseDto {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleResponseDto {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Request DTO for listing the allowed rules of a role.
///
/// `id` stays untyped so a non-integer id is reported as `Invalid id`
/// rather than as a JSON syntax error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AllowedRulesRequestDto {
    #[serde(default)]
    #[schema(value_type = i64)]
    pub id: Option<serde_json::Value>,
}

impl AllowedRulesRequestDto {
    /// The id when it is a positive integer
    pub fn role_id(&self) -> Option<i64> {
        self.id
            .as_ref()
            .and_then(|v| v.as_i64())
            .filter(|id| *id > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AllowedRuleDto {
    pub object: String,
    pub action: String,
    pub name: String,
}

impl From<&Rule> for AllowedRuleDto {
    fn from(rule: &Rule) -> Self {
        Self {
            object: rule.object.clone(),
            action: rule.action.clone(),
            name: action_name(&rule.object, &rule.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw: &str) -> AllowedRulesRequestDto {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_role_id_requires_positive_integer() {
        assert_eq!(request(r#"{"id": 2}"#).role_id(), Some(2));
        assert_eq!(request(r#"{"id": 0}"#).role_id(), None);
        assert_eq!(request(r#"{"id": -1}"#).role_id(), None);
        assert_eq!(request(r#"{"id": "2"}"#).role_id(), None);
        assert_eq!(request(r#"{"id": 1.5}"#).role_id(), None);
        assert_eq!(request(r#"{}"#).role_id(), None);
    }
}
