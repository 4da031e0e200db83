//! Manufacturer partnership applications.

use tw_backend::{BackendClient, SubmissionError};
use tw_core::entities::PartnershipApplication;
use tw_core::enums::{LeadKind, LeadStatus};

use crate::notify::notify_lead;
use crate::prefill::Prefill;
use crate::validate::{require, require_email, require_gstin};

/// Partnership application form for prospective manufacturer partners.
#[derive(Debug, Clone, Default)]
pub struct PartnershipForm {
    pub user_id: Option<String>,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub gstin: String,
    pub product_categories: Vec<String>,
    pub annual_capacity: Option<String>,
    pub export_experience_years: Option<u32>,
}

impl PartnershipForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefilled(prefill: &Prefill) -> Self {
        Self {
            user_id: prefill.user_id.clone(),
            company_name: prefill.company.clone().unwrap_or_default(),
            contact_name: prefill.name.clone().unwrap_or_default(),
            contact_email: prefill.email.clone().unwrap_or_default(),
            phone: prefill.phone.clone(),
            ..Self::default()
        }
    }

    /// Validate, insert the application and fire the notification.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Validation`] for missing fields, a
    /// malformed GSTIN or an empty category list, or the backend write error.
    pub async fn submit(
        mut self,
        backend: &BackendClient,
    ) -> Result<PartnershipApplication, SubmissionError> {
        require(&self.company_name, "company name")?;
        require(&self.contact_name, "contact name")?;
        require_email(&self.contact_email, "contact email")?;
        require_gstin(&self.gstin)?;
        self.product_categories.retain(|c| !c.trim().is_empty());
        if self.product_categories.is_empty() {
            return Err(SubmissionError::Validation(
                "list at least one product category you can supply".into(),
            ));
        }

        let application = PartnershipApplication {
            id: None,
            user_id: self.user_id,
            company_name: self.company_name,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            phone: self.phone,
            gstin: self.gstin.trim().to_string(),
            product_categories: self.product_categories,
            annual_capacity: self.annual_capacity,
            export_experience_years: self.export_experience_years,
            status: LeadStatus::New,
            created_at: None,
            updated_at: None,
        };

        let stored: PartnershipApplication = backend
            .insert(LeadKind::PartnershipApplication.table(), &application)
            .await?;
        notify_lead(backend, LeadKind::PartnershipApplication, &stored).await;
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PartnershipForm {
        PartnershipForm {
            company_name: "Acme Mills".into(),
            contact_name: "Jane Roe".into(),
            contact_email: "jane@example.com".into(),
            gstin: "27AAPFU0939F1ZV".into(),
            product_categories: vec!["textiles".into()],
            ..PartnershipForm::default()
        }
    }

    #[tokio::test]
    async fn malformed_gstin_is_rejected() {
        let backend = BackendClient::new("https://proj.example.co", "anon");
        let mut bad = form();
        bad.gstin = "not-a-gstin".into();
        let err = bad.submit(&backend).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Validation(_)));
    }

    #[tokio::test]
    async fn categories_must_not_be_empty() {
        let backend = BackendClient::new("https://proj.example.co", "anon");
        let mut bad = form();
        bad.product_categories.clear();
        assert!(bad.submit(&backend).await.is_err());
    }
}
