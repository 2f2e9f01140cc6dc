use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};

/// Key/value settings stored in `properties`
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn get(&self, entity_type: &str, name: &str) -> Result<Option<String>>;

    async fn set(&self, entity_type: &str, name: &str, value: &str) -> Result<()>;
}

pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn get(&self, entity_type: &str, name: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
            FROM properties
            WHERE entity_type = $1 AND name = $2
            "#,
        )
        .bind(entity_type)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read property {}.{}: {:?}", entity_type, name, e);
            AppError::Database(e)
        })
    }

    async fn set(&self, entity_type: &str, name: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO properties (entity_type, name, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (entity_type, name)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(entity_type)
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write property {}.{}: {:?}", entity_type, name, e);
            AppError::Database(e)
        })?;

        Ok(())
    }
}
