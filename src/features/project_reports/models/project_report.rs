use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Materialized 15-minute slot of tracked time for one `(user, task)`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProjectReportRow {
    pub user_id: i64,
    pub user_name: String,
    pub project_id: i64,
    pub project_name: String,
    pub task_id: i64,
    pub task_name: String,
    /// UTC start of the slot
    pub date: DateTime<Utc>,
    /// Seconds
    pub duration: i64,
}
