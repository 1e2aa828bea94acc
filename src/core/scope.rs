//! Path containment against an intent's owned scope.
//!
//! Patterns are path prefixes with an optional `/*` or `/**` suffix; both
//! suffixes mean the same thing here (the base itself or anything under it).
//! Paths and patterns are normalized to forward slashes before matching.
//! An empty pattern list declares no constraint; callers skip the check
//! rather than treating it as deny-all.

/// Normalize a path or pattern to forward slashes.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Whether `relative_path` falls inside any of the owned-scope patterns.
///
/// Returns `false` for an empty pattern list; callers are expected to treat
/// an empty list as "no constraint declared" and skip the check entirely.
pub fn is_within(relative_path: &str, owned_scope: &[String]) -> bool {
    let path = normalize_slashes(relative_path);
    let path = path.trim_start_matches("./").trim_end_matches('/');

    for pattern in owned_scope {
        let pattern = normalize_slashes(pattern);
        let base = pattern
            .strip_suffix("/**")
            .or_else(|| pattern.strip_suffix("/*"))
            .unwrap_or(&pattern)
            .trim_end_matches('/');
        // A bare wildcard leaves nothing to anchor on; skip rather than
        // match everything.
        if base.is_empty() {
            continue;
        }
        if path == base || path.starts_with(&format!("{}/", base)) {
            return true;
        }
    }
    false
}
