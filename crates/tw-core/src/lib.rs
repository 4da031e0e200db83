//! # tw-core
//!
//! Core types and error types for Tradewind.
//!
//! This crate provides the foundational types shared across all Tradewind crates:
//! - `Identity` and `Profile` (the two halves of an authenticated session)
//! - `Role` and the `is_complete` predicate driving post-login routing
//! - `SessionState`, the in-memory projection read by every feature
//! - Route classification (`RouteSubtree`, auth/root/admin predicates)
//! - Lead entities and the `LeadStatus` workflow enum
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod profile;
pub mod routes;
pub mod session;

pub use errors::CoreError;
pub use identity::Identity;
pub use profile::{Profile, Role};
pub use session::SessionState;
