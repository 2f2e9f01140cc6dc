use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for role
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `(role, object, action) -> allow` entry
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Rule {
    pub role_id: i64,
    pub object: String,
    pub action: String,
    pub allow: bool,
}
