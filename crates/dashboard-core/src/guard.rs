//! Navigation guard for dashboard routes

use dashboard_api::{GuardDecision, GuardView};

/// Reachable without a session
pub const PUBLIC_PATHS: &[&str] = &["/", "/login", "/register"];

/// Never guarded
pub const UNGUARDED_PREFIXES: &[&str] = &[
    "/api",
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
    "/mockServiceWorker.js",
];

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

fn is_unguarded(path: &str) -> bool {
    UNGUARDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Decide whether navigating to `path` is allowed
pub fn guard_navigation(path: &str, has_session: bool) -> GuardView {
    let redirect = |location: &str| GuardView {
        decision: GuardDecision::Redirect,
        location: Some(location.to_string()),
    };

    if is_unguarded(path) {
        return GuardView {
            decision: GuardDecision::Allow,
            location: None,
        };
    }

    let is_public = PUBLIC_PATHS.contains(&path);

    if !has_session && !is_public {
        return redirect(LOGIN_PATH);
    }
    if has_session && is_public && path != "/" {
        return redirect(DASHBOARD_PATH);
    }

    GuardView {
        decision: GuardDecision::Allow,
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str, has_session: bool) -> Option<String> {
        guard_navigation(path, has_session).location
    }

    #[test]
    fn test_anonymous_redirected_to_login() {
        assert_eq!(location("/dashboard", false).as_deref(), Some("/login"));
        assert_eq!(location("/dashboard/users", false).as_deref(), Some("/login"));
        assert_eq!(location("/login", false), None);
        assert_eq!(location("/register", false), None);
        assert_eq!(location("/", false), None);
    }

    #[test]
    fn test_session_redirected_away_from_auth_pages() {
        assert_eq!(location("/login", true).as_deref(), Some("/dashboard"));
        assert_eq!(location("/register", true).as_deref(), Some("/dashboard"));
        assert_eq!(location("/", true), None);
        assert_eq!(location("/dashboard", true), None);
    }

    #[test]
    fn test_unguarded_prefixes() {
        for path in ["/api/metrics", "/_next/static/app.js", "/favicon.ico"] {
            let view = guard_navigation(path, false);
            assert_eq!(view.decision, GuardDecision::Allow);
        }

        // Plain string prefix, not per segment
        assert_eq!(location("/apiary", false), None);
        assert_eq!(location("/settings", false).as_deref(), Some("/login"));
    }
}
