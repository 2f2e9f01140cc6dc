/// Every `(object, action)` pair the API checks, with a display name
const ACTIONS: &[(&str, &str, &str)] = &[
    ("project-report", "list", "Project report list"),
    ("project-report", "projects", "Project report related projects"),
    ("project-report", "screenshots", "Project report screenshots"),
    ("time-duration", "list", "Time duration list"),
    ("roles", "list", "Role list"),
    ("roles", "allowed-rules", "Role allowed rules"),
    ("roles", "full_access", "Roles full access"),
    ("users", "full_access", "Users full access"),
    ("users", "relations", "Attached users relations"),
    ("projects", "full_access", "Projects full access"),
    ("company-settings", "show", "Company settings show"),
    ("company-settings", "edit", "Company settings edit"),
];

/// Display name of a rule; unknown pairs fall back to `object.action`
pub fn action_name(object: &str, action: &str) -> String {
    ACTIONS
        .iter()
        .find(|(o, a, _)| *o == object && *a == action)
        .map(|(_, _, name)| name.to_string())
        .unwrap_or_else(|| format!("{}.{}", object, action))
}
