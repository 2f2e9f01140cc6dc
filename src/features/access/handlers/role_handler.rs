use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::access::dtos::{AllowedRuleDto, AllowedRulesRequestDto, RoleResponseDto};
use crate::features::access::services::AccessService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{ACT_ALLOWED_RULES, ACT_LIST, OBJ_ROLES};
use crate::shared::types::{ApiResponse, ErrorResponse, Meta};

/// List roles visible to the current user
#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "Visible roles", body = ApiResponse<Vec<RoleResponseDto>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing roles.list", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn list_roles(
    State(service): State<Arc<AccessService>>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<RoleResponseDto>>>> {
    let principal = service.principal(user.user_id).await?;
    principal.require(OBJ_ROLES, ACT_LIST)?;

    let roles = service.list_roles(&principal).await?;
    let total = roles.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(roles),
        None,
        Some(Meta { total }),
    )))
}

/// List the allowed rules of a role
#[utoipa::path(
    post,
    path = "/api/roles/allowed-rules",
    request_body = AllowedRulesRequestDto,
    responses(
        (status = 200, description = "Allowed rules", body = ApiResponse<Vec<AllowedRuleDto>>),
        (status = 400, description = "Invalid id or unknown role", body = ErrorResponse),
        (status = 403, description = "Missing roles.allowed-rules", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn allowed_rules(
    State(service): State<Arc<AccessService>>,
    user: AuthenticatedUser,
    AppJson(dto): AppJson<AllowedRulesRequestDto>,
) -> Result<Json<ApiResponse<Vec<AllowedRuleDto>>>> {
    let principal = service.principal(user.user_id).await?;
    principal.require(OBJ_ROLES, ACT_ALLOWED_RULES)?;

    let rules = service.allowed_rules(&principal, dto.role_id()).await?;
    Ok(Json(ApiResponse::success(Some(rules), None, None)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{test_app, InMemoryStore, ALICE, MANAGER, ROOT};

    fn server(user_id: i64) -> TestServer {
        TestServer::new(test_app(Arc::new(InMemoryStore::fixture()), user_id)).unwrap()
    }

    fn role_ids(body: &Value) -> Vec<i64> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_role_visibility_follows_permissions() {
        let root: Value = server(ROOT).get("/api/roles").await.json();
        assert_eq!(role_ids(&root), vec![1, 2, 3]);

        let manager: Value = server(MANAGER).get("/api/roles").await.json();
        assert_eq!(role_ids(&manager), vec![2, 3]);

        let alice: Value = server(ALICE).get("/api/roles").await.json();
        assert_eq!(role_ids(&alice), vec![3]);
        assert_eq!(alice["meta"]["total"], json!(1));
    }

    #[tokio::test]
    async fn test_allowed_rules_lists_only_allowed_entries() {
        let response = server(MANAGER)
            .post("/api/roles/allowed-rules")
            .json(&json!({"id": 3}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        let rules = body["data"].as_array().unwrap();
        assert_eq!(rules.len(), 4);
        assert!(rules.contains(&json!({
            "object": "project-report",
            "action": "list",
            "name": "Project report list"
        })));
        assert!(!rules
            .iter()
            .any(|r| r["action"] == json!("screenshots")));
    }

    #[tokio::test]
    async fn test_allowed_rules_rejects_invalid_id() {
        let response = server(MANAGER)
            .post("/api/roles/allowed-rules")
            .json(&json!({"id": "abc"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], json!("Validation fail"));
        assert_eq!(body["reason"], json!("Invalid id"));
    }

    #[tokio::test]
    async fn test_allowed_rules_of_hidden_or_missing_role() {
        let hidden = server(MANAGER)
            .post("/api/roles/allowed-rules")
            .json(&json!({"id": 1}))
            .await;
        assert_eq!(hidden.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = hidden.json();
        assert_eq!(body["error"], json!("Role not found"));

        let missing = server(ROOT)
            .post("/api/roles/allowed-rules")
            .json(&json!({"id": 99}))
            .await;
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = missing.json();
        assert_eq!(body["reason"], json!("Invalid Id"));
    }

    #[tokio::test]
    async fn test_allowed_rules_requires_permission() {
        let response = server(ALICE)
            .post("/api/roles/allowed-rules")
            .json(&json!({"id": 3}))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
