use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::core::error::{AppError, FieldErrors, Result};
use crate::features::access::models::Principal;
use crate::features::access::AccessService;
use crate::features::project_reports::dtos::{
    DayDurationDto, IntervalScreenshotsDto, ProjectDto, ProjectsRequestDto, ReportFilterDto,
    ReportProjectDto, ScreenshotsRequestDto, TaskReportQueryDto, UserDayDurationDto,
};
use crate::features::project_reports::models::ProjectReportRow;
use crate::features::project_reports::repository::{ReportRepository, SlotFilter};
use crate::features::project_reports::services::aggregation;
use crate::features::settings::SettingsService;
use crate::shared::timezone::CompanyTz;
use crate::shared::validation::{DateInput, UtcWindow};

/// Permission-scoped reads over materialized report slots.
///
/// Callers check the endpoint permission and run DTO validation first;
/// everything here narrows by visibility and never errors for data the
/// principal may not see.
pub struct ReportService {
    repo: Arc<dyn ReportRepository>,
    access: Arc<AccessService>,
    settings: Arc<SettingsService>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        AppError::field(
            field,
            format!("The {} field is required.", field.replace('_', " ")),
        )
    })
}

fn required_id(value: Option<i64>, field: &str) -> Result<i64> {
    value.ok_or_else(|| {
        AppError::field(
            field,
            format!("The {} field is required.", field.replace('_', " ")),
        )
    })
}

impl ReportService {
    pub fn new(
        repo: Arc<dyn ReportRepository>,
        access: Arc<AccessService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            repo,
            access,
            settings,
        }
    }

    async fn window(
        &self,
        start_at: &Option<String>,
        end_at: &Option<String>,
    ) -> Result<(UtcWindow, CompanyTz)> {
        let tz = self.settings.company_timezone().await?;
        let window = UtcWindow::resolve(
            required(start_at, "start_at")?,
            required(end_at, "end_at")?,
            tz,
        )?;
        Ok((window, tz))
    }

    /// Fail with a field error when any id is missing from storage
    async fn ensure_exist(&self, uids: &[i64], pids: &[i64]) -> Result<()> {
        let mut errors = FieldErrors::new();

        if !uids.is_empty() {
            let found: BTreeSet<i64> =
                self.repo.existing_user_ids(uids).await?.into_iter().collect();
            if uids.iter().any(|id| !found.contains(id)) {
                errors.insert(
                    "uids".to_string(),
                    vec!["The selected uids is invalid.".to_string()],
                );
            }
        }

        if !pids.is_empty() {
            let found: BTreeSet<i64> =
                self.repo.existing_project_ids(pids).await?.into_iter().collect();
            if pids.iter().any(|id| !found.contains(id)) {
                errors.insert(
                    "pids".to_string(),
                    vec!["The selected pids is invalid.".to_string()],
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Visible slots matching a report filter, `None` when nothing can match
    async fn scoped_slots(
        &self,
        principal: &Principal,
        filter: &ReportFilterDto,
        window: UtcWindow,
    ) -> Result<Option<Vec<ProjectReportRow>>> {
        let uids = filter.uids.clone().unwrap_or_default();
        let pids = filter.pids.clone().unwrap_or_default();
        self.ensure_exist(&uids, &pids).await?;

        let scope = self.access.scope(principal).await?;
        let users = scope.users.narrow(&uids);
        let projects = scope.projects.narrow(&pids);

        if users.is_empty() || projects.is_empty() {
            tracing::debug!(
                user_id = principal.id(),
                "Report filter matches nothing visible"
            );
            return Ok(None);
        }

        let rows = self
            .repo
            .report_slots(&SlotFilter {
                user_ids: users.ids(),
                project_ids: projects.ids(),
                task_id: None,
                window,
            })
            .await?;

        Ok(Some(rows))
    }

    /// Projects -> users -> tasks with durations, per-day sums and screenshots
    pub async fn report(
        &self,
        principal: &Principal,
        filter: ReportFilterDto,
    ) -> Result<Vec<ReportProjectDto>> {
        let (window, tz) = self.window(&filter.start_at, &filter.end_at).await?;

        let Some(rows) = self.scoped_slots(principal, &filter, window).await? else {
            return Ok(Vec::new());
        };

        // Users seen per task, so screenshots of unrelated users stay out
        let mut task_users: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
        for row in &rows {
            task_users.entry(row.task_id).or_default().insert(row.user_id);
        }

        let mut intervals = Vec::new();
        for (task_id, users) in &task_users {
            let users: Vec<i64> = users.iter().copied().collect();
            intervals.extend(
                self.repo
                    .task_intervals(*task_id, Some(&users), &window)
                    .await?,
            );
        }

        let interval_ids: Vec<i64> = intervals.iter().map(|i| i.id).collect();
        let screenshots = self.repo.screenshots_of(&interval_ids).await?;
        let index = aggregation::index_screenshots(&intervals, &screenshots);

        let report = aggregation::build_report(&rows, &index, tz);
        tracing::debug!(
            user_id = principal.id(),
            projects = report.len(),
            "Project report built"
        );
        Ok(report)
    }

    /// Per user, per local day totals
    pub async fn days(
        &self,
        principal: &Principal,
        filter: ReportFilterDto,
    ) -> Result<Vec<UserDayDurationDto>> {
        let (window, tz) = self.window(&filter.start_at, &filter.end_at).await?;

        match self.scoped_slots(principal, &filter, window).await? {
            Some(rows) => Ok(aggregation::user_day_totals(&rows, tz)),
            None => Ok(Vec::new()),
        }
    }

    /// Projects related to `uids`, or attached to the requester when empty
    pub async fn projects(
        &self,
        principal: &Principal,
        dto: ProjectsRequestDto,
    ) -> Result<Vec<ProjectDto>> {
        let uids = dto.uids.unwrap_or_default();
        self.ensure_exist(&uids, &[]).await?;

        let scope = self.access.scope(principal).await?;
        let own_attached: BTreeSet<i64> = self
            .access
            .project_ids_attached_to(&[principal.id()])
            .await?
            .into_iter()
            .collect();

        let candidates: BTreeSet<i64> = if uids.is_empty() {
            own_attached
        } else {
            let users = scope
                .users
                .narrow(&uids)
                .ids()
                .unwrap_or_else(|| uids.clone());

            let mut ids: BTreeSet<i64> = self
                .access
                .project_ids_attached_to(&users)
                .await?
                .into_iter()
                .collect();
            ids.extend(self.repo.worked_project_ids(&users).await?);

            if own_attached.is_empty() {
                ids
            } else {
                ids.intersection(&own_attached).copied().collect()
            }
        };

        let ids: Vec<i64> = candidates
            .into_iter()
            .filter(|id| scope.projects.contains(*id))
            .collect();

        let projects = self.repo.projects(&ids).await?;
        Ok(projects.into_iter().map(Into::into).collect())
    }

    /// Per local day totals of one task for one user
    pub async fn task(
        &self,
        principal: &Principal,
        task_id: i64,
        query: TaskReportQueryDto,
    ) -> Result<Vec<DayDurationDto>> {
        let uid = required_id(query.uid, "uid")?;
        let (window, tz) = self.window(&query.start_at, &query.end_at).await?;

        let Some(task) = self.repo.find_task(task_id).await? else {
            return Ok(Vec::new());
        };

        let scope = self.access.scope(principal).await?;
        if !scope.users.contains(uid) || !scope.projects.contains(task.project_id) {
            return Ok(Vec::new());
        }

        let rows = self
            .repo
            .report_slots(&SlotFilter {
                user_ids: Some(vec![uid]),
                project_ids: None,
                task_id: Some(task.id),
                window,
            })
            .await?;

        Ok(aggregation::day_totals(&rows, tz))
    }

    /// Intervals of a task on one UTC day with their screenshots
    pub async fn screenshots(
        &self,
        principal: &Principal,
        dto: ScreenshotsRequestDto,
    ) -> Result<Vec<IntervalScreenshotsDto>> {
        let task_id = required_id(dto.task_id, "task_id")?;
        let date = DateInput::parse(required(&dto.date, "date")?)
            .ok_or_else(|| AppError::field("date", "The date is not a valid date."))?
            .date();
        let window = UtcWindow::utc_day(date);

        let Some(task) = self.repo.find_task(task_id).await? else {
            return Ok(Vec::new());
        };

        let scope = self.access.scope(principal).await?;
        if !scope.projects.contains(task.project_id) {
            return Ok(Vec::new());
        }

        let users = scope.users.ids();
        let intervals = self
            .repo
            .task_intervals(task.id, users.as_deref(), &window)
            .await?;
        let interval_ids: Vec<i64> = intervals.iter().map(|i| i.id).collect();
        let screenshots = self.repo.screenshots_of(&interval_ids).await?;

        Ok(aggregation::interval_screenshots(&intervals, &screenshots))
    }
}
