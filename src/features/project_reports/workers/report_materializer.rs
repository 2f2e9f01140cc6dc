use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;

use crate::core::config::MaterializerConfig;
use crate::core::error::{AppError, Result};
use crate::features::project_reports::repository::ReportRepository;
use crate::features::project_reports::services::aggregation::{materialize, slot_start, slot_width};
use crate::shared::validation::UtcWindow;

/// Background worker that keeps `project_reports` in sync with tracked time.
///
/// Each pass recomputes every slot of the trailing lookback window from the
/// closed intervals that start in it, so intervals closed late are picked
/// up on the next pass.
pub struct ReportMaterializer {
    repo: Arc<dyn ReportRepository>,
    interval: Duration,
    lookback: Duration,
}

impl ReportMaterializer {
    pub fn new(repo: Arc<dyn ReportRepository>, config: &MaterializerConfig) -> Self {
        Self {
            repo,
            interval: config.interval,
            lookback: config.lookback,
        }
    }

    /// Run the materializer in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting report materializer (interval {:?}, lookback {:?})",
            self.interval,
            self.lookback
        );

        let mut ticker = interval(self.interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self.rebuild(Utc::now()).await {
                tracing::error!("Error rebuilding report slots: {:?}", e);
            }
        }
    }

    /// Slot-aligned window ending with the slot that contains `now`
    pub fn window(&self, now: DateTime<Utc>) -> Result<UtcWindow> {
        let lookback = chrono::Duration::from_std(self.lookback)
            .map_err(|e| AppError::Internal(format!("Invalid lookback: {}", e)))?;

        Ok(UtcWindow {
            start: slot_start(now - lookback),
            end: slot_start(now) + slot_width(),
        })
    }

    /// Recompute every slot of the lookback window ending at `now`
    pub async fn rebuild(&self, now: DateTime<Utc>) -> Result<u64> {
        let window = self.window(now)?;
        let facts = self.repo.interval_facts(&window).await?;
        let rows = materialize(&facts);
        let written = self.repo.replace_slots(&window, &rows).await?;

        tracing::debug!(
            "Rebuilt report slots {} .. {}: {} intervals into {} slots",
            window.start,
            window.end,
            facts.len(),
            written
        );
        Ok(written)
    }
}
