/// Timezone used when the company has none configured
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// `properties.entity_type` for company-wide settings
pub const COMPANY_ENTITY: &str = "company";

/// `properties.name` of the company timezone
pub const TIMEZONE_PROPERTY: &str = "TIMEZONE";

/// Width of a materialized report slot. Every real-world UTC offset is a
/// multiple of this, so a slot never straddles a local midnight.
pub const REPORT_SLOT_MINUTES: i64 = 15;

// =============================================================================
// PERMISSION OBJECTS AND ACTIONS
// =============================================================================

pub const OBJ_PROJECT_REPORT: &str = "project-report";
pub const OBJ_TIME_DURATION: &str = "time-duration";
pub const OBJ_ROLES: &str = "roles";
pub const OBJ_USERS: &str = "users";
pub const OBJ_PROJECTS: &str = "projects";
pub const OBJ_COMPANY_SETTINGS: &str = "company-settings";

pub const ACT_LIST: &str = "list";
pub const ACT_PROJECTS: &str = "projects";
pub const ACT_SCREENSHOTS: &str = "screenshots";
pub const ACT_ALLOWED_RULES: &str = "allowed-rules";
pub const ACT_FULL_ACCESS: &str = "full_access";
pub const ACT_RELATIONS: &str = "relations";
pub const ACT_SHOW: &str = "show";
pub const ACT_EDIT: &str = "edit";
