use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for time interval. `end_at` is `None` while tracking runs.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TimeInterval {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

/// A closed interval joined with the names the report rows carry
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IntervalFact {
    pub user_id: i64,
    pub user_name: String,
    pub project_id: i64,
    pub project_name: String,
    pub task_id: i64,
    pub task_name: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}
