//! Application-level profile attributes and the role enum.
//!
//! A `Profile` row is created server-side when an account is created and
//! fetched by the profile resolver. Completeness (non-empty full name AND a
//! set role) is what post-login routing branches on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Application role attached to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manufacturer,
    Client,
}

impl Role {
    /// String representation used in the profiles table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manufacturer => "manufacturer",
            Self::Client => "client",
        }
    }

    /// Parse the table/metadata representation back into a role.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "manufacturer" => Some(Self::Manufacturer),
            "client" => Some(Self::Client),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level attributes for an identity.
///
/// `role == None` means the role tag is unset — the account went through
/// sign-up but has not completed the profile flow yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Manufacturer tax id. Only populated for manufacturer accounts.
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Profile {
    /// A profile is complete iff the full name is non-empty AND a role is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.full_name.as_deref().is_some_and(|n| !n.trim().is_empty()) && self.role.is_some()
    }
}
