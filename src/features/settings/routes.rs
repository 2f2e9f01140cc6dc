use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::access::AccessService;
use crate::features::settings::handlers::{self, SettingsState};
use crate::features::settings::services::SettingsService;

/// Create routes for company settings
pub fn routes(settings: Arc<SettingsService>, access: Arc<AccessService>) -> Router {
    Router::new()
        .route(
            "/api/company-settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .with_state(SettingsState { settings, access })
}
