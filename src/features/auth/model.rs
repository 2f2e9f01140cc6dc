use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity resolved from a verified bearer token.
///
/// Only the user id travels with the request; role rules and attached users
/// are loaded per request by the access service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}
