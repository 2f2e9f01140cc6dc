use std::collections::{BTreeSet, HashMap};

use crate::core::error::{AppError, Result};
use crate::features::access::models::{Rule, User};
use crate::shared::constants::{ACT_FULL_ACCESS, ACT_RELATIONS, OBJ_USERS};

/// Rules of one role, keyed by `(object, action)`. Missing entries deny.
#[derive(Debug, Clone, Default)]
pub struct Permissions {
    rules: HashMap<(String, String), bool>,
}

impl Permissions {
    pub fn from_rules(rules: &[Rule]) -> Self {
        let rules = rules
            .iter()
            .map(|r| ((r.object.clone(), r.action.clone()), r.allow))
            .collect();
        Self { rules }
    }

    pub fn can(&self, object: &str, action: &str) -> bool {
        self.rules
            .get(&(object.to_string(), action.to_string()))
            .copied()
            .unwrap_or(false)
    }
}

/// Set of ids a principal may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    All,
    Only(BTreeSet<i64>),
}

impl Visibility {
    pub fn only(ids: impl IntoIterator<Item = i64>) -> Self {
        Visibility::Only(ids.into_iter().collect())
    }

    pub fn contains(&self, id: i64) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Only(ids) => ids.contains(&id),
        }
    }

    /// Restrict to `requested`; an empty request keeps the current set
    pub fn narrow(&self, requested: &[i64]) -> Visibility {
        if requested.is_empty() {
            return self.clone();
        }

        Visibility::Only(
            requested
                .iter()
                .copied()
                .filter(|id| self.contains(*id))
                .collect(),
        )
    }

    /// True when nothing can match
    pub fn is_empty(&self) -> bool {
        matches!(self, Visibility::Only(ids) if ids.is_empty())
    }

    /// Explicit id list, `None` meaning unrestricted
    pub fn ids(&self) -> Option<Vec<i64>> {
        match self {
            Visibility::All => None,
            Visibility::Only(ids) => Some(ids.iter().copied().collect()),
        }
    }
}

/// Authenticated user with its role rules and attached users loaded
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub permissions: Permissions,
    pub attached_user_ids: Vec<i64>,
}

impl Principal {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn can(&self, object: &str, action: &str) -> bool {
        self.permissions.can(object, action)
    }

    /// Fail with `403` unless the role allows `object.action`
    pub fn require(&self, object: &str, action: &str) -> Result<()> {
        if self.can(object, action) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = self.user.id,
                "Permission {}.{} denied",
                object,
                action
            );
            Err(AppError::Forbidden(format!(
                "Missing permission {}.{}",
                object, action
            )))
        }
    }

    pub fn has_relations(&self) -> bool {
        self.can(OBJ_USERS, ACT_RELATIONS)
    }

    /// Self, plus attached users when the role grants `users.relations`
    pub fn visible_users(&self) -> Visibility {
        if self.can(OBJ_USERS, ACT_FULL_ACCESS) {
            return Visibility::All;
        }

        let mut ids = BTreeSet::from([self.user.id]);
        if self.has_relations() {
            ids.extend(self.attached_user_ids.iter().copied());
        }
        Visibility::Only(ids)
    }

    /// Users whose directly attached projects this principal may see
    pub fn project_owner_ids(&self) -> Vec<i64> {
        let mut ids = vec![self.user.id];
        if self.has_relations() {
            ids.extend(self.attached_user_ids.iter().copied());
        }
        ids
    }
}

/// Users and projects a principal may see, resolved for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    pub users: Visibility,
    pub projects: Visibility,
}
