// Role gate — authority roles bypass content analysis entirely.

/// Literal used on the command line to mean "argument not provided".
pub const SENTINEL_NONE: &str = "none";

/// Roles that are never analyzed. Fixed by policy, not configurable.
const EXEMPT_ROLES: [&str; 2] = ["TEACHER", "ADMIN"];

/// Normalize a role string: trim surrounding whitespace and uppercase.
/// Any string normalizes; there is no error condition here.
pub fn normalize_role(role: &str) -> String {
    role.trim().to_uppercase()
}

/// Whether a normalized role is in the exempt set.
pub fn is_exempt(normalized_role: &str) -> bool {
    EXEMPT_ROLES.contains(&normalized_role)
}
