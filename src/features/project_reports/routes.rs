use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::access::AccessService;
use crate::features::project_reports::handlers::{self, ReportState};
use crate::features::project_reports::services::ReportService;

/// Create routes for the project report feature
pub fn routes(reports: Arc<ReportService>, access: Arc<AccessService>) -> Router {
    let routes = Router::new()
        .route("/report", post(handlers::report))
        .route("/days", post(handlers::days))
        .route("/projects", post(handlers::projects))
        .route(
            "/task/{id}",
            get(handlers::task_get).post(handlers::task_post),
        )
        .route("/screenshots", post(handlers::screenshots))
        .with_state(ReportState { reports, access });

    Router::new().nest("/api/project-report", routes)
}
