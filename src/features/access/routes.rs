use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::access::handlers;
use crate::features::access::services::AccessService;

/// Create routes for roles
pub fn routes(service: Arc<AccessService>) -> Router {
    Router::new()
        .route("/api/roles", get(handlers::list_roles))
        .route("/api/roles/allowed-rules", post(handlers::allowed_rules))
        .with_state(service)
}
