use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::LeadStatus;

/// A careers-page application (`job_applications` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub applicant_name: String,
    pub applicant_email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Position being applied for, matching a careers-page listing.
    pub position: String,
    /// Storage path of the uploaded resume, set after upload succeeds.
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub status: LeadStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
