use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::access::AccessService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::project_reports::dtos::{
    DayDurationDto, IntervalScreenshotsDto, ProjectDto, ProjectsRequestDto, ReportFilterDto,
    ReportProjectDto, ScreenshotsRequestDto, TaskReportQueryDto, UserDayDurationDto,
};
use crate::features::project_reports::services::ReportService;
use crate::shared::constants::{
    ACT_LIST, ACT_PROJECTS, ACT_SCREENSHOTS, OBJ_PROJECT_REPORT, OBJ_TIME_DURATION,
};
use crate::shared::types::{ApiResponse, ErrorResponse, Meta};

#[derive(Clone)]
pub struct ReportState {
    pub reports: Arc<ReportService>,
    pub access: Arc<AccessService>,
}

fn listed<T>(items: Vec<T>) -> Json<ApiResponse<Vec<T>>> {
    let total = items.len() as i64;
    Json(ApiResponse::success(Some(items), None, Some(Meta { total })))
}

/// Aggregated time per project, user and task
///
/// Dates without an offset are read in the company timezone. Durations are
/// bucketed by local day; screenshots by local day and hour.
#[utoipa::path(
    post,
    path = "/api/project-report/report",
    request_body = ReportFilterDto,
    responses(
        (status = 200, description = "Project report", body = ApiResponse<Vec<ReportProjectDto>>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing project-report.list", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "project-report"
)]
pub async fn report(
    State(state): State<ReportState>,
    user: AuthenticatedUser,
    AppJson(filter): AppJson<ReportFilterDto>,
) -> Result<Json<ApiResponse<Vec<ReportProjectDto>>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_PROJECT_REPORT, ACT_LIST)?;
    filter.validate()?;

    let report = state.reports.report(&principal, filter).await?;
    Ok(listed(report))
}

/// Total time per user per local day
#[utoipa::path(
    post,
    path = "/api/project-report/days",
    request_body = ReportFilterDto,
    responses(
        (status = 200, description = "Daily totals", body = ApiResponse<Vec<UserDayDurationDto>>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing time-duration.list", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "project-report"
)]
pub async fn days(
    State(state): State<ReportState>,
    user: AuthenticatedUser,
    AppJson(filter): AppJson<ReportFilterDto>,
) -> Result<Json<ApiResponse<Vec<UserDayDurationDto>>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_TIME_DURATION, ACT_LIST)?;
    filter.validate()?;

    let days = state.reports.days(&principal, filter).await?;
    Ok(listed(days))
}

/// Visible projects the given users are attached to or have worked on
#[utoipa::path(
    post,
    path = "/api/project-report/projects",
    request_body = ProjectsRequestDto,
    responses(
        (status = 200, description = "Projects", body = ApiResponse<Vec<ProjectDto>>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing project-report.projects", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "project-report"
)]
pub async fn projects(
    State(state): State<ReportState>,
    user: AuthenticatedUser,
    AppJson(dto): AppJson<ProjectsRequestDto>,
) -> Result<Json<ApiResponse<Vec<ProjectDto>>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_PROJECT_REPORT, ACT_PROJECTS)?;
    dto.validate()?;

    let projects = state.reports.projects(&principal, dto).await?;
    Ok(listed(projects))
}

async fn task_report(
    state: ReportState,
    user: AuthenticatedUser,
    task_id: i64,
    query: TaskReportQueryDto,
) -> Result<Json<ApiResponse<Vec<DayDurationDto>>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_PROJECT_REPORT, ACT_LIST)?;
    query.validate()?;

    let days = state.reports.task(&principal, task_id, query).await?;
    Ok(listed(days))
}

/// Per local day totals of one task for one user (query string)
#[utoipa::path(
    get,
    path = "/api/project-report/task/{id}",
    params(
        ("id" = i64, Path, description = "Task id"),
        TaskReportQueryDto
    ),
    responses(
        (status = 200, description = "Daily totals", body = ApiResponse<Vec<DayDurationDto>>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing project-report.list", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "project-report"
)]
pub async fn task_get(
    State(state): State<ReportState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppQuery(query): AppQuery<TaskReportQueryDto>,
) -> Result<Json<ApiResponse<Vec<DayDurationDto>>>> {
    task_report(state, user, id, query).await
}

/// Per local day totals of one task for one user (JSON body)
#[utoipa::path(
    post,
    path = "/api/project-report/task/{id}",
    params(("id" = i64, Path, description = "Task id")),
    request_body = TaskReportQueryDto,
    responses(
        (status = 200, description = "Daily totals", body = ApiResponse<Vec<DayDurationDto>>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing project-report.list", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "project-report"
)]
pub async fn task_post(
    State(state): State<ReportState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(query): AppJson<TaskReportQueryDto>,
) -> Result<Json<ApiResponse<Vec<DayDurationDto>>>> {
    task_report(state, user, id, query).await
}

/// Intervals of a task on a UTC day, each with its screenshots
#[utoipa::path(
    post,
    path = "/api/project-report/screenshots",
    request_body = ScreenshotsRequestDto,
    responses(
        (status = 200, description = "Intervals with screenshots", body = ApiResponse<Vec<IntervalScreenshotsDto>>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing project-report.screenshots", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "project-report"
)]
pub async fn screenshots(
    State(state): State<ReportState>,
    user: AuthenticatedUser,
    AppJson(dto): AppJson<ScreenshotsRequestDto>,
) -> Result<Json<ApiResponse<Vec<IntervalScreenshotsDto>>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_PROJECT_REPORT, ACT_SCREENSHOTS)?;
    dto.validate()?;

    let intervals = state.reports.screenshots(&principal, dto).await?;
    Ok(listed(intervals))
}
