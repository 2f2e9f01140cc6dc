use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Screenshot {
    pub id: i64,
    pub time_interval_id: i64,
    pub path: String,
    pub thumbnail_path: Option<String>,
    pub created_at: DateTime<Utc>,
}
