//! Route authorization gate.

use std::collections::HashSet;

use tw_core::SessionState;
use tw_core::profile::Role;
use tw_core::routes::RouteSubtree;

/// Which route subtrees are mounted for the given session.
///
/// Pure function, recomputed on every session change:
/// - Public is always visible
/// - Admin iff the resolved role is admin
/// - Manufacturer iff the resolved role is manufacturer
/// - Client iff an identity is present with any other (or no) role
#[must_use]
pub fn visible_routes(session: &SessionState) -> HashSet<RouteSubtree> {
    let mut visible = HashSet::from([RouteSubtree::Public]);
    match session.role() {
        Some(Role::Admin) => {
            visible.insert(RouteSubtree::Admin);
        }
        Some(Role::Manufacturer) => {
            visible.insert(RouteSubtree::AuthenticatedManufacturer);
        }
        Some(Role::Client) | None => {
            if session.is_authenticated() {
                visible.insert(RouteSubtree::AuthenticatedClient);
            }
        }
    }
    visible
}
