//! Pure report computations over rows already loaded from storage.
//!
//! Every grouping goes through a `BTreeMap`, so identical inputs always
//! produce identically ordered output.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::features::project_reports::dtos::{
    DayDurationDto, IntervalScreenshotsDto, ReportProjectDto, ReportTaskDto, ReportUserDto,
    ScreenshotDto, ScreenshotGroups, UserDayDurationDto,
};
use crate::features::project_reports::models::{
    IntervalFact, ProjectReportRow, Screenshot, TimeInterval,
};
use crate::shared::constants::REPORT_SLOT_MINUTES;
use crate::shared::timezone::{local_date, local_hour_label, CompanyTz};

/// Screenshots of one `(user_id, task_id)` inside the report window
pub type ScreenshotIndex = HashMap<(i64, i64), Vec<Screenshot>>;

/// UTC start of the report slot containing `at`
pub fn slot_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let slot_secs = REPORT_SLOT_MINUTES * 60;
    let secs = at.timestamp();
    let floored = secs - secs.rem_euclid(slot_secs);
    DateTime::from_timestamp(floored, 0).unwrap_or(at)
}

/// Length of one report slot
pub fn slot_width() -> Duration {
    Duration::minutes(REPORT_SLOT_MINUTES)
}

/// Sum closed intervals into slots keyed by `(user, task, slot start)`.
///
/// The whole duration of an interval goes to the slot its `start_at` falls in.
pub fn materialize(facts: &[IntervalFact]) -> Vec<ProjectReportRow> {
    let mut slots: BTreeMap<(i64, i64, DateTime<Utc>), ProjectReportRow> = BTreeMap::new();

    for fact in facts {
        let duration = (fact.end_at - fact.start_at).num_seconds();
        if duration <= 0 {
            continue;
        }

        let date = slot_start(fact.start_at);
        slots
            .entry((fact.user_id, fact.task_id, date))
            .and_modify(|row| row.duration += duration)
            .or_insert_with(|| ProjectReportRow {
                user_id: fact.user_id,
                user_name: fact.user_name.clone(),
                project_id: fact.project_id,
                project_name: fact.project_name.clone(),
                task_id: fact.task_id,
                task_name: fact.task_name.clone(),
                date,
                duration,
            });
    }

    slots.into_values().collect()
}

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Bucket screenshots by local day, then local hour, oldest first
pub fn group_screenshots(screenshots: &[Screenshot], tz: CompanyTz) -> ScreenshotGroups {
    let mut sorted: Vec<&Screenshot> = screenshots.iter().collect();
    sorted.sort_by_key(|s| (s.created_at, s.id));

    let mut groups = ScreenshotGroups::new();
    for shot in sorted {
        groups
            .entry(day_key(local_date(tz, shot.created_at)))
            .or_default()
            .entry(local_hour_label(tz, shot.created_at))
            .or_default()
            .push(ScreenshotDto::from(shot));
    }
    groups
}

struct TaskAcc {
    name: String,
    days: BTreeMap<String, i64>,
}

struct UserAcc {
    name: String,
    tasks: BTreeMap<i64, TaskAcc>,
}

struct ProjectAcc {
    name: String,
    users: BTreeMap<i64, UserAcc>,
}

/// Nest slots into projects -> users -> tasks with per-local-day sums
pub fn build_report(
    rows: &[ProjectReportRow],
    screenshots: &ScreenshotIndex,
    tz: CompanyTz,
) -> Vec<ReportProjectDto> {
    let mut projects: BTreeMap<i64, ProjectAcc> = BTreeMap::new();

    for row in rows {
        let project = projects.entry(row.project_id).or_insert_with(|| ProjectAcc {
            name: row.project_name.clone(),
            users: BTreeMap::new(),
        });
        let user = project.users.entry(row.user_id).or_insert_with(|| UserAcc {
            name: row.user_name.clone(),
            tasks: BTreeMap::new(),
        });
        let task = user.tasks.entry(row.task_id).or_insert_with(|| TaskAcc {
            name: row.task_name.clone(),
            days: BTreeMap::new(),
        });

        *task
            .days
            .entry(day_key(local_date(tz, row.date)))
            .or_insert(0) += row.duration;
    }

    projects
        .into_iter()
        .map(|(project_id, project)| {
            let users: Vec<ReportUserDto> = project
                .users
                .into_iter()
                .map(|(user_id, user)| {
                    let tasks: Vec<ReportTaskDto> = user
                        .tasks
                        .into_iter()
                        .map(|(task_id, task)| ReportTaskDto {
                            id: task_id,
                            project_id,
                            user_id,
                            task_name: task.name,
                            duration: task.days.values().sum(),
                            days: task.days,
                            screenshots: screenshots
                                .get(&(user_id, task_id))
                                .map(|shots| group_screenshots(shots, tz))
                                .unwrap_or_default(),
                        })
                        .collect();

                    ReportUserDto {
                        id: user_id,
                        full_name: user.name,
                        tasks_time: tasks.iter().map(|t| t.duration).sum(),
                        tasks,
                    }
                })
                .collect();

            ReportProjectDto {
                id: project_id,
                name: project.name,
                project_time: users.iter().map(|u| u.tasks_time).sum(),
                users,
            }
        })
        .collect()
}

/// Per user, per local day totals
pub fn user_day_totals(rows: &[ProjectReportRow], tz: CompanyTz) -> Vec<UserDayDurationDto> {
    let mut totals: BTreeMap<(i64, NaiveDate), i64> = BTreeMap::new();
    for row in rows {
        *totals
            .entry((row.user_id, local_date(tz, row.date)))
            .or_insert(0) += row.duration;
    }

    totals
        .into_iter()
        .map(|((user_id, date), duration)| UserDayDurationDto {
            user_id,
            date,
            duration,
        })
        .collect()
}

/// Per local day totals
pub fn day_totals(rows: &[ProjectReportRow], tz: CompanyTz) -> Vec<DayDurationDto> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in rows {
        *totals.entry(local_date(tz, row.date)).or_insert(0) += row.duration;
    }

    totals
        .into_iter()
        .map(|(date, duration)| DayDurationDto { date, duration })
        .collect()
}

/// Pair each interval with its screenshots; intervals without any keep an
/// empty list
pub fn interval_screenshots(
    intervals: &[TimeInterval],
    screenshots: &[Screenshot],
) -> Vec<IntervalScreenshotsDto> {
    let mut by_interval: HashMap<i64, Vec<&Screenshot>> = HashMap::new();
    for shot in screenshots {
        by_interval.entry(shot.time_interval_id).or_default().push(shot);
    }

    let mut sorted: Vec<&TimeInterval> = intervals.iter().collect();
    sorted.sort_by_key(|i| (i.start_at, i.id));

    sorted
        .into_iter()
        .map(|interval| {
            let mut shots = by_interval.remove(&interval.id).unwrap_or_default();
            shots.sort_by_key(|s| (s.created_at, s.id));

            IntervalScreenshotsDto {
                time_interval_id: interval.id,
                user_id: interval.user_id,
                start_at: interval.start_at,
                end_at: interval.end_at,
                screenshots: shots.into_iter().map(ScreenshotDto::from).collect(),
            }
        })
        .collect()
}

/// Index screenshots by the `(user, task)` of the interval they belong to
pub fn index_screenshots(intervals: &[TimeInterval], screenshots: &[Screenshot]) -> ScreenshotIndex {
    let owners: HashMap<i64, (i64, i64)> = intervals
        .iter()
        .map(|i| (i.id, (i.user_id, i.task_id)))
        .collect();

    let mut index = ScreenshotIndex::new();
    for shot in screenshots {
        if let Some(key) = owners.get(&shot.time_interval_id) {
            index.entry(*key).or_default().push(shot.clone());
        }
    }
    index
}
