use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::LeadStatus;

/// One product line on a quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteProduct {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    /// Unit of measure, e.g. "kg", "mt", "pcs".
    pub unit: String,
    #[serde(default)]
    pub target_price_usd: Option<f64>,
}

/// Shipment leg of a quote request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDetails {
    pub origin_country: String,
    pub destination_country: String,
    /// Incoterm the buyer wants quoted, e.g. "FOB", "CIF".
    #[serde(default)]
    pub incoterm: Option<String>,
    /// "sea", "air" or "road".
    #[serde(default)]
    pub transport_mode: Option<String>,
}

/// A submitted quote request (`quote_requests` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub id: Option<String>,
    /// Identity id of the submitter, when signed in.
    #[serde(default)]
    pub user_id: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub shipment: ShipmentDetails,
    pub products: Vec<QuoteProduct>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: LeadStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
