//! Route classification shared by the navigation logic and the route gate.
//!
//! Routes are plain strings (the hosting application owns its router); this
//! module only knows which subtree a path belongs to and which paths are
//! auth pages or the root.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known application routes.
pub mod paths {
    pub const ROOT: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const SIGNUP: &str = "/signup";
    pub const COMPLETE_PROFILE: &str = "/complete-profile";
    pub const DASHBOARD: &str = "/dashboard";
    pub const MANUFACTURER_DASHBOARD: &str = "/manufacturer/dashboard";
    pub const ADMIN_HOME: &str = "/admin";
}

/// A named group of UI routes gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSubtree {
    Public,
    AuthenticatedClient,
    AuthenticatedManufacturer,
    Admin,
}

impl RouteSubtree {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::AuthenticatedClient => "authenticated_client",
            Self::AuthenticatedManufacturer => "authenticated_manufacturer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for RouteSubtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `route` is inside the admin subtree.
#[must_use]
pub fn is_admin_route(route: &str) -> bool {
    route == paths::ADMIN_HOME || route.starts_with("/admin/")
}

/// Whether `route` is an auth page (login/signup) — pages a freshly
/// signed-in user should be redirected away from.
#[must_use]
pub fn is_auth_route(route: &str) -> bool {
    matches!(route, paths::LOGIN | paths::SIGNUP)
}

/// Whether `route` is the root marketing page.
#[must_use]
pub fn is_root_route(route: &str) -> bool {
    route == paths::ROOT
}
