use sqlx::FromRow;

/// Database model for user (the columns access control needs)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role_id: i64,
    pub active: bool,
}
