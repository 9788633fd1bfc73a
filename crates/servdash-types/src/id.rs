/// Prefix for server ids.
pub const SERVER_ID_PREFIX: &str = "srv";
/// Prefix for site ids.
pub const SITE_ID_PREFIX: &str = "site";
/// Prefix for custom fields attached to servers.
pub const SERVER_FIELD_ID_PREFIX: &str = "cf_srv";
/// Prefix for custom fields attached to sites.
pub const SITE_FIELD_ID_PREFIX: &str = "cf_site";

/// Generate a new time-ordered id of the form `{prefix}_{uuid-v7}`.
///
/// Ids are opaque strings; callers that need collection-wide uniqueness
/// should go through [`Collection::fresh_id`](crate::Collection::fresh_id).
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::now_v7().simple())
}
