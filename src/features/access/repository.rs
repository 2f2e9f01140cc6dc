use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::access::models::{Role, Rule, User};

/// Storage access needed to resolve principals and role visibility
#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>>;

    async fn rules_for_role(&self, role_id: i64) -> Result<Vec<Rule>>;

    /// Subordinates attached to `user_id`
    async fn attached_user_ids(&self, user_id: i64) -> Result<Vec<i64>>;

    /// Projects with any of `user_ids` directly attached
    async fn project_ids_attached_to(&self, user_ids: &[i64]) -> Result<Vec<i64>>;

    /// Roles held by `user_ids`
    async fn role_ids_of(&self, user_ids: &[i64]) -> Result<Vec<i64>>;

    /// Roles ordered by id; `None` lists every role
    async fn list_roles(&self, ids: Option<&[i64]>) -> Result<Vec<Role>>;
}

pub struct PgAccessRepository {
    pool: PgPool,
}

impl PgAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, role_id, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn rules_for_role(&self, role_id: i64) -> Result<Vec<Rule>> {
        sqlx::query_as::<_, Rule>(
            r#"
            SELECT role_id, object, action, allow
            FROM rules
            WHERE role_id = $1
            ORDER BY object, action
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch rules for role {}: {:?}", role_id, e);
            AppError::Database(e)
        })
    }

    async fn attached_user_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT attached_user_id
            FROM user_attached_users
            WHERE user_id = $1
            ORDER BY attached_user_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch attached users of {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn project_ids_attached_to(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT project_id
            FROM projects_users
            WHERE user_id = ANY($1)
            ORDER BY project_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch attached projects: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn role_ids_of(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT role_id
            FROM users
            WHERE id = ANY($1)
            ORDER BY role_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch role ids: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_roles(&self, ids: Option<&[i64]>) -> Result<Vec<Role>> {
        let query = match ids {
            Some(ids) => sqlx::query_as::<_, Role>(
                r#"
                SELECT id, name, created_at, updated_at
                FROM roles
                WHERE deleted_at IS NULL AND id = ANY($1)
                ORDER BY id
                "#,
            )
            .bind(ids),
            None => sqlx::query_as::<_, Role>(
                r#"
                SELECT id, name, created_at, updated_at
                FROM roles
                WHERE deleted_at IS NULL
                ORDER BY id
                "#,
            ),
        };

        query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to list roles: {:?}", e);
            AppError::Database(e)
        })
    }
}
