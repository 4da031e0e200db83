//! Catalog request capture.

use tw_backend::{BackendClient, SubmissionError};
use tw_core::entities::CatalogRequest;
use tw_core::enums::{LeadKind, LeadStatus};

use crate::notify::notify_lead;
use crate::prefill::Prefill;
use crate::validate::{require, require_email};

/// Single-page catalog request form.
#[derive(Debug, Clone, Default)]
pub struct CatalogRequestForm {
    pub user_id: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub company_name: Option<String>,
    pub categories: Vec<String>,
    pub notes: Option<String>,
}

impl CatalogRequestForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefilled(prefill: &Prefill) -> Self {
        Self {
            user_id: prefill.user_id.clone(),
            contact_name: prefill.name.clone().unwrap_or_default(),
            contact_email: prefill.email.clone().unwrap_or_default(),
            company_name: prefill.company.clone(),
            ..Self::default()
        }
    }

    /// Validate, insert the request and fire the notification.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Validation`] for missing contact details or
    /// an empty category selection, or the backend write error.
    pub async fn submit(
        mut self,
        backend: &BackendClient,
    ) -> Result<CatalogRequest, SubmissionError> {
        require(&self.contact_name, "contact name")?;
        require_email(&self.contact_email, "contact email")?;
        self.categories.retain(|c| !c.trim().is_empty());
        if self.categories.is_empty() {
            return Err(SubmissionError::Validation(
                "select at least one product category".into(),
            ));
        }

        let request = CatalogRequest {
            id: None,
            user_id: self.user_id,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            company_name: self.company_name,
            categories: self.categories,
            notes: self.notes,
            status: LeadStatus::New,
            created_at: None,
            updated_at: None,
        };

        let stored: CatalogRequest = backend
            .insert(LeadKind::CatalogRequest.table(), &request)
            .await?;
        notify_lead(backend, LeadKind::CatalogRequest, &stored).await;
        Ok(stored)
    }
}
