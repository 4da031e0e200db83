//! Multi-step quote request.
//!
//! The draft walks contact → shipment → products → review; each `advance`
//! validates the current step, and `submit` is only reachable from review.
//! Navigation backwards never validates — a user may leave a half-filled
//! step to fix an earlier one.

use tw_backend::{BackendClient, SubmissionError};
use tw_core::entities::{QuoteProduct, QuoteRequest, ShipmentDetails};
use tw_core::enums::{LeadKind, LeadStatus};

use crate::notify::notify_lead;
use crate::prefill::Prefill;
use crate::validate::{require, require_email};

/// Steps of the quote form, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStep {
    Contact,
    Shipment,
    Products,
    Review,
}

impl QuoteStep {
    const fn next(self) -> Self {
        match self {
            Self::Contact => Self::Shipment,
            Self::Shipment => Self::Products,
            Self::Products | Self::Review => Self::Review,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Contact | Self::Shipment => Self::Contact,
            Self::Products => Self::Shipment,
            Self::Review => Self::Products,
        }
    }
}

/// In-progress quote request.
#[derive(Debug, Clone, Default)]
pub struct QuoteDraft {
    step: Option<QuoteStep>,
    pub user_id: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub company_name: Option<String>,
    pub shipment: ShipmentDetails,
    pub products: Vec<QuoteProduct>,
    pub notes: Option<String>,
}

impl QuoteDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a draft with the signed-in user's contact details filled in.
    #[must_use]
    pub fn prefilled(prefill: &Prefill) -> Self {
        Self {
            user_id: prefill.user_id.clone(),
            contact_name: prefill.name.clone().unwrap_or_default(),
            contact_email: prefill.email.clone().unwrap_or_default(),
            contact_phone: prefill.phone.clone(),
            company_name: prefill.company.clone(),
            ..Self::default()
        }
    }

    /// The step currently shown.
    #[must_use]
    pub fn step(&self) -> QuoteStep {
        self.step.unwrap_or(QuoteStep::Contact)
    }

    /// Validate the current step and move forward.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Validation`] naming the offending field;
    /// the draft stays on the current step.
    pub fn advance(&mut self) -> Result<QuoteStep, SubmissionError> {
        match self.step() {
            QuoteStep::Contact => self.validate_contact()?,
            QuoteStep::Shipment => self.validate_shipment()?,
            QuoteStep::Products => self.validate_products()?,
            QuoteStep::Review => {}
        }
        let next = self.step().next();
        self.step = Some(next);
        Ok(next)
    }

    /// Move back one step without validating.
    pub fn back(&mut self) -> QuoteStep {
        let previous = self.step().previous();
        self.step = Some(previous);
        previous
    }

    /// Submit the reviewed draft: insert the row and fire the notification.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Validation`] if the draft has not reached
    /// review (or a field regressed), or the backend write error.
    pub async fn submit(mut self, backend: &BackendClient) -> Result<QuoteRequest, SubmissionError> {
        if self.step() != QuoteStep::Review {
            return Err(SubmissionError::Validation(
                "quote request has not been reviewed".into(),
            ));
        }
        // Re-check everything; fields may have been edited on review.
        self.validate_contact()?;
        self.validate_shipment()?;
        self.validate_products()?;

        let request = QuoteRequest {
            id: None,
            user_id: self.user_id.take(),
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            company_name: self.company_name,
            shipment: self.shipment,
            products: self.products,
            notes: self.notes,
            status: LeadStatus::New,
            created_at: None,
            updated_at: None,
        };

        let stored: QuoteRequest = backend
            .insert(LeadKind::QuoteRequest.table(), &request)
            .await?;
        notify_lead(backend, LeadKind::QuoteRequest, &stored).await;
        Ok(stored)
    }

    fn validate_contact(&self) -> Result<(), SubmissionError> {
        require(&self.contact_name, "contact name")?;
        require_email(&self.contact_email, "contact email")
    }

    fn validate_shipment(&self) -> Result<(), SubmissionError> {
        require(&self.shipment.origin_country, "origin country")?;
        require(&self.shipment.destination_country, "destination country")
    }

    fn validate_products(&self) -> Result<(), SubmissionError> {
        if self.products.is_empty() {
            return Err(SubmissionError::Validation(
                "at least one product is required".into(),
            ));
        }
        for product in &self.products {
            require(&product.name, "product name")?;
            if product.quantity <= 0.0 {
                return Err(SubmissionError::Validation(format!(
                    "quantity for {} must be positive",
                    product.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product() -> QuoteProduct {
        QuoteProduct {
            name: "Basmati rice".into(),
            category: "agro".into(),
            quantity: 20.0,
            unit: "mt".into(),
            target_price_usd: None,
        }
    }

    fn filled_draft() -> QuoteDraft {
        QuoteDraft {
            contact_name: "Jane Roe".into(),
            contact_email: "jane@example.com".into(),
            shipment: ShipmentDetails {
                origin_country: "IN".into(),
                destination_country: "AE".into(),
                incoterm: Some("FOB".into()),
                transport_mode: Some("sea".into()),
            },
            products: vec![product()],
            ..QuoteDraft::default()
        }
    }

    #[test]
    fn walks_all_steps_in_order() {
        let mut draft = filled_draft();
        assert_eq!(draft.step(), QuoteStep::Contact);
        assert_eq!(draft.advance().unwrap(), QuoteStep::Shipment);
        assert_eq!(draft.advance().unwrap(), QuoteStep::Products);
        assert_eq!(draft.advance().unwrap(), QuoteStep::Review);
        // advancing from review stays on review
        assert_eq!(draft.advance().unwrap(), QuoteStep::Review);
    }

    #[test]
    fn contact_step_blocks_on_bad_email() {
        let mut draft = filled_draft();
        draft.contact_email = "not-an-email".into();
        assert!(draft.advance().is_err());
        assert_eq!(draft.step(), QuoteStep::Contact, "stays on failing step");
    }

    #[test]
    fn shipment_step_requires_both_countries() {
        let mut draft = filled_draft();
        draft.shipment.destination_country.clear();
        draft.advance().unwrap();
        assert!(draft.advance().is_err());
        assert_eq!(draft.step(), QuoteStep::Shipment);
    }

    #[test]
    fn products_step_rejects_empty_and_nonpositive_quantities() {
        let mut draft = filled_draft();
        draft.products.clear();
        draft.advance().unwrap();
        draft.advance().unwrap();
        assert!(draft.advance().is_err());

        draft.products = vec![QuoteProduct {
            quantity: 0.0,
            ..product()
        }];
        assert!(draft.advance().is_err());

        draft.products = vec![product()];
        assert_eq!(draft.advance().unwrap(), QuoteStep::Review);
    }

    #[test]
    fn back_never_validates() {
        let mut draft = filled_draft();
        draft.advance().unwrap();
        draft.contact_email.clear(); // now invalid
        assert_eq!(draft.back(), QuoteStep::Contact);
    }

    #[tokio::test]
    async fn submit_before_review_is_rejected() {
        let backend = BackendClient::new("https://proj.example.co", "anon");
        let draft = filled_draft();
        let err = draft.submit(&backend).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Validation(_)));
    }

    #[test]
    fn prefill_lands_in_contact_fields() {
        let prefill = Prefill {
            user_id: Some("u-1".into()),
            name: Some("Jane Roe".into()),
            email: Some("jane@example.com".into()),
            phone: None,
            company: Some("Acme Exports".into()),
        };
        let draft = QuoteDraft::prefilled(&prefill);
        assert_eq!(draft.contact_name, "Jane Roe");
        assert_eq!(draft.contact_email, "jane@example.com");
        assert_eq!(draft.company_name.as_deref(), Some("Acme Exports"));
        assert_eq!(draft.user_id.as_deref(), Some("u-1"));
    }
}
