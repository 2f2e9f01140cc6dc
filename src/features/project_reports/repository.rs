use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::project_reports::models::{
    IntervalFact, ProjectReportRow, ProjectSummary, Screenshot, Task, TimeInterval,
};
use crate::shared::validation::UtcWindow;

/// Which materialized slots to read. `None` id lists are unrestricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFilter {
    pub user_ids: Option<Vec<i64>>,
    pub project_ids: Option<Vec<i64>>,
    pub task_id: Option<i64>,
    pub window: UtcWindow,
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Subset of `ids` that exist in `users`
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<Vec<i64>>;

    /// Subset of `ids` that exist in `projects`
    async fn existing_project_ids(&self, ids: &[i64]) -> Result<Vec<i64>>;

    /// Slots whose start lies in the filter window, ordered by key
    async fn report_slots(&self, filter: &SlotFilter) -> Result<Vec<ProjectReportRow>>;

    async fn find_task(&self, id: i64) -> Result<Option<Task>>;

    /// Intervals of a task starting inside `window`, ordered by start
    async fn task_intervals(
        &self,
        task_id: i64,
        user_ids: Option<&[i64]>,
        window: &UtcWindow,
    ) -> Result<Vec<TimeInterval>>;

    async fn screenshots_of(&self, interval_ids: &[i64]) -> Result<Vec<Screenshot>>;

    /// Projects with tracked time by any of `user_ids`
    async fn worked_project_ids(&self, user_ids: &[i64]) -> Result<Vec<i64>>;

    async fn projects(&self, ids: &[i64]) -> Result<Vec<ProjectSummary>>;

    /// Closed intervals starting inside `window`
    async fn interval_facts(&self, window: &UtcWindow) -> Result<Vec<IntervalFact>>;

    /// Swap every slot inside `window` for `rows` in one transaction
    async fn replace_slots(&self, window: &UtcWindow, rows: &[ProjectReportRow]) -> Result<u64>;
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check user ids: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn existing_project_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, i64>("SELECT id FROM projects WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check project ids: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn report_slots(&self, filter: &SlotFilter) -> Result<Vec<ProjectReportRow>> {
        sqlx::query_as::<_, ProjectReportRow>(
            r#"
            SELECT user_id, user_name, project_id, project_name, task_id, task_name, date, duration
            FROM project_reports
            WHERE date >= $1
              AND date < $2
              AND ($3::BIGINT[] IS NULL OR user_id = ANY($3))
              AND ($4::BIGINT[] IS NULL OR project_id = ANY($4))
              AND ($5::BIGINT IS NULL OR task_id = $5)
            ORDER BY project_id, user_id, task_id, date
            "#,
        )
        .bind(filter.window.start)
        .bind(filter.window.end)
        .bind(filter.user_ids.as_deref())
        .bind(filter.project_ids.as_deref())
        .bind(filter.task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read report slots: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, user_id, task_name, active
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch task {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn task_intervals(
        &self,
        task_id: i64,
        user_ids: Option<&[i64]>,
        window: &UtcWindow,
    ) -> Result<Vec<TimeInterval>> {
        sqlx::query_as::<_, TimeInterval>(
            r#"
            SELECT id, task_id, user_id, start_at, end_at
            FROM time_intervals
            WHERE task_id = $1
              AND start_at >= $2
              AND start_at < $3
              AND ($4::BIGINT[] IS NULL OR user_id = ANY($4))
            ORDER BY start_at, id
            "#,
        )
        .bind(task_id)
        .bind(window.start)
        .bind(window.end)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch intervals of task {}: {:?}", task_id, e);
            AppError::Database(e)
        })
    }

    async fn screenshots_of(&self, interval_ids: &[i64]) -> Result<Vec<Screenshot>> {
        if interval_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Screenshot>(
            r#"
            SELECT id, time_interval_id, path, thumbnail_path, created_at
            FROM screenshots
            WHERE time_interval_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(interval_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch screenshots: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn worked_project_ids(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT t.project_id
            FROM time_intervals ti
            JOIN tasks t ON t.id = ti.task_id
            WHERE ti.user_id = ANY($1)
            ORDER BY t.project_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch worked projects: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn projects(&self, ids: &[i64]) -> Result<Vec<ProjectSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ProjectSummary>(
            "SELECT id, name FROM projects WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch projects: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn interval_facts(&self, window: &UtcWindow) -> Result<Vec<IntervalFact>> {
        sqlx::query_as::<_, IntervalFact>(
            r#"
            SELECT
                ti.user_id,
                u.full_name AS user_name,
                p.id AS project_id,
                p.name AS project_name,
                t.id AS task_id,
                t.task_name,
                ti.start_at,
                ti.end_at
            FROM time_intervals ti
            JOIN tasks t ON t.id = ti.task_id
            JOIN projects p ON p.id = t.project_id
            JOIN users u ON u.id = ti.user_id
            WHERE ti.end_at IS NOT NULL
              AND ti.start_at >= $1
              AND ti.start_at < $2
            ORDER BY ti.start_at, ti.id
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch interval facts: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn replace_slots(&self, window: &UtcWindow, rows: &[ProjectReportRow]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM project_reports WHERE date >= $1 AND date < $2")
            .bind(window.start)
            .bind(window.end)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear report slots: {:?}", e);
                AppError::Database(e)
            })?;

        let mut inserted = 0;
        for row in rows {
            inserted += sqlx::query(
                r#"
                INSERT INTO project_reports
                    (user_id, user_name, project_id, project_name, task_id, task_name, date, duration)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(row.user_id)
            .bind(&row.user_name)
            .bind(row.project_id)
            .bind(&row.project_name)
            .bind(row.task_id)
            .bind(&row.task_name)
            .bind(row.date)
            .bind(row.duration)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert report slot: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
