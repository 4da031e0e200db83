use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::LeadStatus;

/// A manufacturer partnership application (`partnership_applications` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipApplication {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// 15-character GST identification number of the manufacturer.
    pub gstin: String,
    /// Product categories the manufacturer can supply.
    pub product_categories: Vec<String>,
    #[serde(default)]
    pub annual_capacity: Option<String>,
    #[serde(default)]
    pub export_experience_years: Option<u32>,
    pub status: LeadStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
