use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub task_name: String,
    pub active: bool,
}

/// `id` and `name` of a project
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
}
