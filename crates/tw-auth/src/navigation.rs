//! Post-sign-in navigation intent.
//!
//! A one-shot redirect decision computed from {profile, current route}. The
//! orchestrator applies at most one intent per sign-in transition; the
//! hosting application's router executes it through the [`Navigator`] trait.

use tw_core::profile::{Profile, Role};
use tw_core::routes::{is_admin_route, is_auth_route, is_root_route, paths};

/// A computed redirect. `replace` asks the router to replace the history
/// entry so the user cannot navigate back to the auth page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub to: String,
    pub replace: bool,
}

/// Router seam owned by the hosting application.
pub trait Navigator: Send + Sync {
    /// The route currently displayed.
    fn current_route(&self) -> String;

    /// Apply a redirect.
    fn navigate(&self, intent: &NavigationIntent);
}

/// Home route for a resolved role.
#[must_use]
pub const fn role_home(role: Role) -> &'static str {
    match role {
        Role::Admin => paths::ADMIN_HOME,
        Role::Manufacturer => paths::MANUFACTURER_DASHBOARD,
        Role::Client => paths::DASHBOARD,
    }
}

/// Compute the navigation intent for a sign-in transition.
///
/// Pure function of {profile, role hint, current route}:
/// - inside the admin subtree: never redirect (don't hijack an admin mid-flow)
/// - profile missing or incomplete: redirect to profile completion, carrying
///   the best-known role hint
/// - on an auth page or the root with a complete profile: redirect to the
///   role's home, replacing history
/// - anywhere else: stay put
#[must_use]
pub fn navigation_intent(
    profile: Option<&Profile>,
    role_hint: Option<Role>,
    current_route: &str,
) -> Option<NavigationIntent> {
    if is_admin_route(current_route) {
        return None;
    }

    let complete = profile.is_some_and(Profile::is_complete);
    if !complete {
        let hint = profile.and_then(|p| p.role).or(role_hint);
        let to = hint.map_or_else(
            || paths::COMPLETE_PROFILE.to_string(),
            |role| format!("{}?role={role}", paths::COMPLETE_PROFILE),
        );
        return Some(NavigationIntent { to, replace: false });
    }

    if is_auth_route(current_route) || is_root_route(current_route) {
        let role = profile.and_then(|p| p.role).unwrap_or(Role::Client);
        return Some(NavigationIntent {
            to: role_home(role).to_string(),
            replace: true,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn profile(full_name: &str, role: Option<Role>) -> Profile {
        Profile {
            id: "u-1".into(),
            full_name: if full_name.is_empty() {
                None
            } else {
                Some(full_name.into())
            },
            role,
            ..Profile::default()
        }
    }

    #[test]
    fn incomplete_profile_routes_to_completion_from_anywhere() {
        let p = profile("", None);
        let intent = navigation_intent(Some(&p), None, "/dashboard").unwrap();
        assert_eq!(intent.to, "/complete-profile");
        assert!(!intent.replace);
    }

    #[test]
    fn completion_redirect_carries_role_hint() {
        let intent = navigation_intent(None, Some(Role::Manufacturer), "/login").unwrap();
        assert_eq!(intent.to, "/complete-profile?role=manufacturer");
    }

    #[rstest]
    #[case(Role::Admin, "/", "/admin")]
    #[case(Role::Manufacturer, "/login", "/manufacturer/dashboard")]
    #[case(Role::Client, "/signup", "/dashboard")]
    fn complete_profile_on_auth_or_root_goes_home_replacing_history(
        #[case] role: Role,
        #[case] from: &str,
        #[case] home: &str,
    ) {
        let p = profile("Jane", Some(role));
        let intent = navigation_intent(Some(&p), None, from).unwrap();
        assert_eq!(intent.to, home);
        assert!(intent.replace, "auth page must not remain in history");
    }

    #[test]
    fn admin_subtree_is_never_hijacked() {
        let p = profile("Jane", Some(Role::Client));
        assert_eq!(navigation_intent(Some(&p), None, "/admin/anything"), None);
        // even with an incomplete profile
        let p = profile("", None);
        assert_eq!(navigation_intent(Some(&p), None, "/admin/quotes"), None);
    }

    #[test]
    fn complete_profile_on_ordinary_page_stays_put() {
        let p = profile("Jane", Some(Role::Manufacturer));
        assert_eq!(navigation_intent(Some(&p), None, "/products"), None);
    }
}
