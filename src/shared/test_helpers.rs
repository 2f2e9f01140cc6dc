//! In-memory repositories and fixtures for handler and worker tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::access::models::{Role, Rule, User};
use crate::features::access::{routes as access_routes, AccessRepository, AccessService};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::project_reports::models::{
    IntervalFact, ProjectReportRow, ProjectSummary, Screenshot, Task, TimeInterval,
};
use crate::features::project_reports::repository::SlotFilter;
use crate::features::project_reports::services::aggregation::materialize;
use crate::features::project_reports::{routes as report_routes, ReportRepository, ReportService};
use crate::features::settings::{routes as settings_routes, PropertyRepository, SettingsService};
use crate::shared::constants::{COMPANY_ENTITY, TIMEZONE_PROPERTY};
use crate::shared::validation::UtcWindow;

pub const ROOT: i64 = 1;
pub const MANAGER: i64 = 2;
pub const ALICE: i64 = 3;
pub const BOB: i64 = 4;
pub const GHOST: i64 = 5;

pub const APOLLO: i64 = 101;
pub const GEMINI: i64 = 102;
pub const MERCURY: i64 = 103;

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[derive(Default)]
struct Tables {
    roles: Vec<Role>,
    rules: Vec<Rule>,
    users: Vec<User>,
    attached_users: Vec<(i64, i64)>,
    projects: Vec<ProjectSummary>,
    project_users: Vec<(i64, i64)>,
    tasks: Vec<Task>,
    intervals: Vec<TimeInterval>,
    screenshots: Vec<Screenshot>,
    slots: Vec<ProjectReportRow>,
    properties: BTreeMap<(String, String), String>,
}

/// Every repository trait backed by plain vectors
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

fn rule(role_id: i64, object: &str, action: &str) -> Rule {
    Rule {
        role_id,
        object: object.to_string(),
        action: action.to_string(),
        allow: true,
    }
}

fn user(id: i64, name: &str, role_id: i64, active: bool) -> User {
    User {
        id,
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role_id,
        active,
    }
}

impl InMemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Root, a manager with Alice attached, Alice and Bob as plain users and
    /// an inactive Ghost. Alice works on Apollo and Mercury, Bob on Gemini.
    /// Slots are materialized from the fixture intervals.
    pub fn fixture() -> Self {
        let store = Self::default();
        {
            let mut t = store.tables();
            let created = utc("2019-01-01T00:00:00Z");
            for (id, name) in [(1, "root"), (2, "manager"), (3, "user")] {
                t.roles.push(Role {
                    id,
                    name: name.to_string(),
                    created_at: created,
                    updated_at: created,
                });
            }

            for (object, action) in [
                ("project-report", "list"),
                ("project-report", "projects"),
                ("project-report", "screenshots"),
                ("time-duration", "list"),
                ("roles", "list"),
                ("roles", "allowed-rules"),
                ("roles", "full_access"),
                ("users", "full_access"),
                ("users", "relations"),
                ("projects", "full_access"),
                ("company-settings", "show"),
                ("company-settings", "edit"),
            ] {
                t.rules.push(rule(1, object, action));
            }
            for (object, action) in [
                ("project-report", "list"),
                ("project-report", "projects"),
                ("project-report", "screenshots"),
                ("time-duration", "list"),
                ("roles", "list"),
                ("roles", "allowed-rules"),
                ("users", "relations"),
                ("company-settings", "show"),
            ] {
                t.rules.push(rule(2, object, action));
            }
            for (object, action) in [
                ("project-report", "list"),
                ("project-report", "projects"),
                ("time-duration", "list"),
                ("roles", "list"),
            ] {
                t.rules.push(rule(3, object, action));
            }
            t.rules.push(Rule {
                allow: false,
                ..rule(3, "project-report", "screenshots")
            });

            t.users = vec![
                user(ROOT, "Root", 1, true),
                user(MANAGER, "Manager", 2, true),
                user(ALICE, "Alice", 3, true),
                user(BOB, "Bob", 3, true),
                user(GHOST, "Ghost", 3, false),
            ];
            t.attached_users = vec![(MANAGER, ALICE)];

            t.projects = vec![
                ProjectSummary {
                    id: APOLLO,
                    name: "Apollo".to_string(),
                },
                ProjectSummary {
                    id: GEMINI,
                    name: "Gemini".to_string(),
                },
                ProjectSummary {
                    id: MERCURY,
                    name: "Mercury".to_string(),
                },
            ];
            t.project_users = vec![(APOLLO, MANAGER), (APOLLO, ALICE), (GEMINI, BOB)];

            for (id, project_id, user_id, name) in [
                (11, APOLLO, ALICE, "Design"),
                (12, APOLLO, ALICE, "Build"),
                (21, GEMINI, BOB, "Launch"),
                (31, MERCURY, ALICE, "Review"),
            ] {
                t.tasks.push(Task {
                    id,
                    project_id,
                    user_id,
                    task_name: name.to_string(),
                    active: true,
                });
            }
        }

        let late = store.add_interval(
            11,
            ALICE,
            "2019-06-30T22:00:00Z",
            Some("2019-06-30T22:30:00Z"),
        );
        let morning = store.add_interval(
            11,
            ALICE,
            "2019-07-01T09:00:00Z",
            Some("2019-07-01T10:00:00Z"),
        );
        store.add_interval(
            12,
            ALICE,
            "2019-07-01T12:00:00Z",
            Some("2019-07-01T12:15:00Z"),
        );
        let bobs = store.add_interval(
            21,
            BOB,
            "2019-07-01T09:00:00Z",
            Some("2019-07-01T09:30:00Z"),
        );
        store.add_interval(
            31,
            ALICE,
            "2019-07-02T08:00:00Z",
            Some("2019-07-02T08:10:00Z"),
        );

        store.add_screenshot(late, "2019-06-30T22:05:00Z");
        store.add_screenshot(morning, "2019-07-01T09:10:00Z");
        store.add_screenshot(morning, "2019-07-01T09:40:00Z");
        store.add_screenshot(bobs, "2019-07-01T09:05:00Z");

        store.rebuild_slots();
        store.set_timezone("UTC");
        store
    }

    pub fn add_interval(&self, task_id: i64, user_id: i64, start: &str, end: Option<&str>) -> i64 {
        let mut t = self.tables();
        let id = t.intervals.len() as i64 + 1;
        t.intervals.push(TimeInterval {
            id,
            task_id,
            user_id,
            start_at: utc(start),
            end_at: end.map(utc),
        });
        id
    }

    pub fn add_screenshot(&self, interval_id: i64, at: &str) -> i64 {
        let mut t = self.tables();
        let id = t.screenshots.len() as i64 + 1;
        t.screenshots.push(Screenshot {
            id,
            time_interval_id: interval_id,
            path: format!("uploads/screenshots/{}.jpg", id),
            thumbnail_path: Some(format!("uploads/screenshots/thumbs/{}.jpg", id)),
            created_at: utc(at),
        });
        id
    }

    pub fn set_timezone(&self, name: &str) {
        self.tables().properties.insert(
            (COMPANY_ENTITY.to_string(), TIMEZONE_PROPERTY.to_string()),
            name.to_string(),
        );
    }

    pub fn timezone(&self) -> Option<String> {
        self.tables()
            .properties
            .get(&(COMPANY_ENTITY.to_string(), TIMEZONE_PROPERTY.to_string()))
            .cloned()
    }

    pub fn clear_slots(&self) {
        self.tables().slots.clear();
    }

    pub fn slots(&self) -> Vec<ProjectReportRow> {
        let mut slots = self.tables().slots.clone();
        slots.sort_by_key(|s| (s.user_id, s.task_id, s.date));
        slots
    }

    /// Materialize every closed interval
    pub fn rebuild_slots(&self) {
        let facts = self.facts(None);
        self.tables().slots = materialize(&facts);
    }

    fn facts(&self, window: Option<&UtcWindow>) -> Vec<IntervalFact> {
        let t = self.tables();
        t.intervals
            .iter()
            .filter(|i| window.map_or(true, |w| w.contains(i.start_at)))
            .filter_map(|i| {
                let end_at = i.end_at?;
                let task = t.tasks.iter().find(|task| task.id == i.task_id)?;
                let project = t.projects.iter().find(|p| p.id == task.project_id)?;
                let user = t.users.iter().find(|u| u.id == i.user_id)?;
                Some(IntervalFact {
                    user_id: user.id,
                    user_name: user.full_name.clone(),
                    project_id: project.id,
                    project_name: project.name.clone(),
                    task_id: task.id,
                    task_name: task.task_name.clone(),
                    start_at: i.start_at,
                    end_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl AccessRepository for InMemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn rules_for_role(&self, role_id: i64) -> Result<Vec<Rule>> {
        Ok(self
            .tables()
            .rules
            .iter()
            .filter(|r| r.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn attached_user_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .tables()
            .attached_users
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, attached)| *attached)
            .collect())
    }

    async fn project_ids_attached_to(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .tables()
            .project_users
            .iter()
            .filter(|(_, user_id)| user_ids.contains(user_id))
            .map(|(project_id, _)| *project_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn role_ids_of(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .tables()
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .map(|u| u.role_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn list_roles(&self, ids: Option<&[i64]>) -> Result<Vec<Role>> {
        Ok(self
            .tables()
            .roles
            .iter()
            .filter(|r| ids.map_or(true, |ids| ids.contains(&r.id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PropertyRepository for InMemoryStore {
    async fn get(&self, entity_type: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .tables()
            .properties
            .get(&(entity_type.to_string(), name.to_string()))
            .cloned())
    }

    async fn set(&self, entity_type: &str, name: &str, value: &str) -> Result<()> {
        self.tables().properties.insert(
            (entity_type.to_string(), name.to_string()),
            value.to_string(),
        );
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        Ok(self
            .tables()
            .users
            .iter()
            .map(|u| u.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn existing_project_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        Ok(self
            .tables()
            .projects
            .iter()
            .map(|p| p.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn report_slots(&self, filter: &SlotFilter) -> Result<Vec<ProjectReportRow>> {
        let mut rows: Vec<ProjectReportRow> = self
            .tables()
            .slots
            .iter()
            .filter(|s| filter.window.contains(s.date))
            .filter(|s| filter.user_ids.as_ref().map_or(true, |ids| ids.contains(&s.user_id)))
            .filter(|s| {
                filter
                    .project_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&s.project_id))
            })
            .filter(|s| filter.task_id.map_or(true, |id| id == s.task_id))
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.project_id, s.user_id, s.task_id, s.date));
        Ok(rows)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.tables().tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn task_intervals(
        &self,
        task_id: i64,
        user_ids: Option<&[i64]>,
        window: &UtcWindow,
    ) -> Result<Vec<TimeInterval>> {
        let mut intervals: Vec<TimeInterval> = self
            .tables()
            .intervals
            .iter()
            .filter(|i| i.task_id == task_id && window.contains(i.start_at))
            .filter(|i| user_ids.map_or(true, |ids| ids.contains(&i.user_id)))
            .cloned()
            .collect();
        intervals.sort_by_key(|i| (i.start_at, i.id));
        Ok(intervals)
    }

    async fn screenshots_of(&self, interval_ids: &[i64]) -> Result<Vec<Screenshot>> {
        Ok(self
            .tables()
            .screenshots
            .iter()
            .filter(|s| interval_ids.contains(&s.time_interval_id))
            .cloned()
            .collect())
    }

    async fn worked_project_ids(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        let t = self.tables();
        let mut ids: Vec<i64> = t
            .intervals
            .iter()
            .filter(|i| user_ids.contains(&i.user_id))
            .filter_map(|i| t.tasks.iter().find(|task| task.id == i.task_id))
            .map(|task| task.project_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn projects(&self, ids: &[i64]) -> Result<Vec<ProjectSummary>> {
        Ok(self
            .tables()
            .projects
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn interval_facts(&self, window: &UtcWindow) -> Result<Vec<IntervalFact>> {
        Ok(self.facts(Some(window)))
    }

    async fn replace_slots(&self, window: &UtcWindow, rows: &[ProjectReportRow]) -> Result<u64> {
        let mut t = self.tables();
        t.slots.retain(|s| !window.contains(s.date));
        t.slots.extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }
}

async fn inject_user(user_id: i64, mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });
    next.run(request).await
}

/// Authenticate every request of `router` as `user_id`
pub fn with_user(router: Router, user_id: i64) -> Router {
    router.layer(axum::middleware::from_fn(
        move |request: Request, next: Next| inject_user(user_id, request, next),
    ))
}

/// Every API route wired to `store`, authenticated as `user_id`
pub fn test_app(store: Arc<InMemoryStore>, user_id: i64) -> Router {
    let access = Arc::new(AccessService::new(store.clone()));
    let settings = Arc::new(SettingsService::new(store.clone()));
    let reports = Arc::new(ReportService::new(
        store,
        Arc::clone(&access),
        Arc::clone(&settings),
    ));

    let router = Router::new()
        .merge(report_routes::routes(reports, Arc::clone(&access)))
        .merge(access_routes::routes(Arc::clone(&access)))
        .merge(settings_routes::routes(settings, access));

    with_user(router, user_id)
}
