use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::project_reports::models::{ProjectSummary, Screenshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScreenshotDto {
    pub id: i64,
    pub time_interval_id: i64,
    pub path: String,
    pub thumbnail_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Screenshot> for ScreenshotDto {
    fn from(s: &Screenshot) -> Self {
        Self {
            id: s.id,
            time_interval_id: s.time_interval_id,
            path: s.path.clone(),
            thumbnail_path: s.thumbnail_path.clone(),
            created_at: s.created_at,
        }
    }
}

/// Local day (`YYYY-MM-DD`) -> local hour (`HH:00`) -> screenshots
pub type ScreenshotGroups = BTreeMap<String, BTreeMap<String, Vec<ScreenshotDto>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportTaskDto {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub task_name: String,
    /// Seconds
    pub duration: i64,
    /// Local day -> seconds
    pub days: BTreeMap<String, i64>,
    #[schema(value_type = Object)]
    pub screenshots: ScreenshotGroups,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportUserDto {
    pub id: i64,
    pub full_name: String,
    pub tasks_time: i64,
    pub tasks: Vec<ReportTaskDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportProjectDto {
    pub id: i64,
    pub name: String,
    pub project_time: i64,
    pub users: Vec<ReportUserDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDayDurationDto {
    pub user_id: i64,
    pub date: NaiveDate,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DayDurationDto {
    pub date: NaiveDate,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectDto {
    pub id: i64,
    pub name: String,
}

impl From<ProjectSummary> for ProjectDto {
    fn from(p: ProjectSummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

/// One tracked interval with the screenshots taken during it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntervalScreenshotsDto {
    pub time_interval_id: i64,
    pub user_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub screenshots: Vec<ScreenshotDto>,
}
