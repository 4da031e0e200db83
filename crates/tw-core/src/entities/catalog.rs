use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::LeadStatus;

/// A product-catalog request (`catalog_requests` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Product categories the requester wants literature for.
    pub categories: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: LeadStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
