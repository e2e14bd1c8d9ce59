use crate::session::Role;

pub const PROVIDER_HOME: &str = "/provider/dashboard";
pub const DEFAULT_HOME: &str = "/";

/// Pick where a freshly authenticated user lands.
///
/// An explicit redirect wins, then the provider dashboard if any of `roles`
/// is a provider, then the site root. Redirects must be same-origin paths.
pub fn resolve_destination(redirect: Option<&str>, roles: &[Role]) -> String {
    if let Some(target) = redirect.and_then(local_path) {
        return target.to_string();
    }
    if roles.contains(&Role::Provider) {
        return PROVIDER_HOME.to_string();
    }
    DEFAULT_HOME.to_string()
}

/// `target` when it is a path on this site.
pub fn local_path(target: &str) -> Option<&str> {
    let target = target.trim();
    (target.starts_with('/') && !target.starts_with("//") && !target.contains('\\'))
        .then_some(target)
}
