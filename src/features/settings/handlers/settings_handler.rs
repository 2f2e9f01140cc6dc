use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::access::AccessService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::settings::dtos::{CompanySettingsDto, UpdateCompanySettingsDto};
use crate::features::settings::services::SettingsService;
use crate::shared::constants::{ACT_EDIT, ACT_SHOW, OBJ_COMPANY_SETTINGS};
use crate::shared::types::{ApiResponse, ErrorResponse};

#[derive(Clone)]
pub struct SettingsState {
    pub settings: Arc<SettingsService>,
    pub access: Arc<AccessService>,
}

/// Get company settings
#[utoipa::path(
    get,
    path = "/api/company-settings",
    responses(
        (status = 200, description = "Company settings", body = ApiResponse<CompanySettingsDto>),
        (status = 403, description = "Missing company-settings.show", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "company-settings"
)]
pub async fn get_settings(
    State(state): State<SettingsState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<CompanySettingsDto>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_COMPANY_SETTINGS, ACT_SHOW)?;

    let settings = state.settings.get().await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

/// Update company settings
#[utoipa::path(
    post,
    path = "/api/company-settings",
    request_body = UpdateCompanySettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<CompanySettingsDto>),
        (status = 400, description = "Validation fail", body = ErrorResponse),
        (status = 403, description = "Missing company-settings.edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "company-settings"
)]
pub async fn update_settings(
    State(state): State<SettingsState>,
    user: AuthenticatedUser,
    AppJson(dto): AppJson<UpdateCompanySettingsDto>,
) -> Result<Json<ApiResponse<CompanySettingsDto>>> {
    let principal = state.access.principal(user.user_id).await?;
    principal.require(OBJ_COMPANY_SETTINGS, ACT_EDIT)?;
    dto.validate()?;

    let settings = state.settings.update(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(settings),
        Some("Settings saved".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{test_app, InMemoryStore, ALICE, MANAGER, ROOT};

    fn server(store: Arc<InMemoryStore>, user_id: i64) -> TestServer {
        TestServer::new(test_app(store, user_id)).unwrap()
    }

    #[tokio::test]
    async fn test_get_company_settings() {
        let server = server(Arc::new(InMemoryStore::fixture()), MANAGER);

        let response = server.get("/api/company-settings").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"], json!({"timezone": "UTC"}));
    }

    #[tokio::test]
    async fn test_update_company_timezone() {
        let store = Arc::new(InMemoryStore::fixture());
        let server = server(store.clone(), ROOT);

        let response = server
            .post("/api/company-settings")
            .json(&json!({"timezone": "Asia/Kolkata"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(store.timezone(), Some("Asia/Kolkata".to_string()));
    }

    #[tokio::test]
    async fn test_update_accepts_fixed_offset() {
        let store = Arc::new(InMemoryStore::fixture());
        let server = server(store.clone(), ROOT);

        let response = server
            .post("/api/company-settings")
            .json(&json!({"timezone": "+03:00"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"], json!({"timezone": "+03:00"}));
        assert_eq!(store.timezone(), Some("+03:00".to_string()));
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_timezone() {
        let store = Arc::new(InMemoryStore::fixture());
        let server = server(store.clone(), ROOT);

        let response = server
            .post("/api/company-settings")
            .json(&json!({"timezone": "Mars/Olympus"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["reason"]["timezone"].is_array());
        assert_eq!(store.timezone(), Some("UTC".to_string()));
    }

    #[tokio::test]
    async fn test_settings_permissions() {
        let store = Arc::new(InMemoryStore::fixture());

        let edit = server(store.clone(), MANAGER)
            .post("/api/company-settings")
            .json(&json!({"timezone": "Europe/Berlin"}))
            .await;
        assert_eq!(edit.status_code(), StatusCode::FORBIDDEN);

        let show = server(store, ALICE).get("/api/company-settings").await;
        assert_eq!(show.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_stored_timezone_falls_back_to_utc() {
        let store = Arc::new(InMemoryStore::fixture());
        store.set_timezone("Not/AZone");
        let settings = crate::features::settings::SettingsService::new(store);

        assert_eq!(
            settings.company_timezone().await.unwrap(),
            crate::shared::timezone::CompanyTz::UTC
        );
    }
}
