use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::error::{AppError, Result, VALIDATION_FAIL};
use crate::features::access::dtos::{AllowedRuleDto, RoleResponseDto};
use crate::features::access::models::{AccessScope, Permissions, Principal, Visibility};
use crate::features::access::repository::AccessRepository;
use crate::shared::constants::{ACT_FULL_ACCESS, OBJ_PROJECTS, OBJ_ROLES};

/// Resolves who is asking and what they may see
pub struct AccessService {
    repo: Arc<dyn AccessRepository>,
}

impl AccessService {
    pub fn new(repo: Arc<dyn AccessRepository>) -> Self {
        Self { repo }
    }

    /// Load the principal behind an authenticated user id.
    ///
    /// A token for a deleted or deactivated user is treated as unauthenticated.
    pub async fn principal(&self, user_id: i64) -> Result<Principal> {
        let user = self
            .repo
            .find_user(user_id)
            .await?
            .filter(|u| u.active)
            .ok_or_else(|| {
                tracing::warn!(user_id, "Token subject is unknown or inactive");
                AppError::Unauthorized("User not found or inactive".to_string())
            })?;

        let rules = self.repo.rules_for_role(user.role_id).await?;
        let attached_user_ids = self.repo.attached_user_ids(user.id).await?;

        Ok(Principal {
            user,
            permissions: Permissions::from_rules(&rules),
            attached_user_ids,
        })
    }

    /// Users and projects visible to `principal`
    pub async fn scope(&self, principal: &Principal) -> Result<AccessScope> {
        let projects = if principal.can(OBJ_PROJECTS, ACT_FULL_ACCESS) {
            Visibility::All
        } else {
            let ids = self
                .repo
                .project_ids_attached_to(&principal.project_owner_ids())
                .await?;
            Visibility::only(ids)
        };

        Ok(AccessScope {
            users: principal.visible_users(),
            projects,
        })
    }

    /// Projects any of `user_ids` is directly attached to
    pub async fn project_ids_attached_to(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        self.repo.project_ids_attached_to(user_ids).await
    }

    async fn visible_roles(&self, principal: &Principal) -> Result<Visibility> {
        if principal.can(OBJ_ROLES, ACT_FULL_ACCESS) {
            return Ok(Visibility::All);
        }

        let mut ids = BTreeSet::from([principal.user.role_id]);
        if principal.has_relations() {
            ids.extend(self.repo.role_ids_of(&principal.attached_user_ids).await?);
        }
        Ok(Visibility::Only(ids))
    }

    pub async fn list_roles(&self, principal: &Principal) -> Result<Vec<RoleResponseDto>> {
        let visible = self.visible_roles(principal).await?;
        let ids = visible.ids();
        let roles = self.repo.list_roles(ids.as_deref()).await?;

        Ok(roles.into_iter().map(Into::into).collect())
    }

    /// Allowed rules of a visible role. `role_id` is `None` when the caller
    /// sent something other than a positive integer.
    pub async fn allowed_rules(
        &self,
        principal: &Principal,
        role_id: Option<i64>,
    ) -> Result<Vec<AllowedRuleDto>> {
        let role_id = role_id.ok_or_else(|| AppError::rejected(VALIDATION_FAIL, "Invalid id"))?;

        let visible = self.visible_roles(principal).await?;
        if !visible.contains(role_id) {
            return Err(AppError::rejected("Role not found", "Invalid Id"));
        }

        let exists = !self.repo.list_roles(Some(&[role_id])).await?.is_empty();
        if !exists {
            return Err(AppError::rejected("Role not found", "Invalid Id"));
        }

        let rules = self.repo.rules_for_role(role_id).await?;
        Ok(rules
            .iter()
            .filter(|r| r.allow)
            .map(AllowedRuleDto::from)
            .collect())
    }
}
