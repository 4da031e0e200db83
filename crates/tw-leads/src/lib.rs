//! # tw-leads
//!
//! Lead capture and triage for Tradewind.
//!
//! The capture side is four independent flows writing straight to the hosted
//! data store: the multi-step quote request, catalog requests, careers-page
//! job applications (with resume upload), and manufacturer partnership
//! applications. Each submission fires a best-effort email notification
//! through the `notify-lead` serverless function.
//!
//! The triage side is [`LeadDesk`]: role-scoped listing, status-workflow
//! transitions and change-feed subscriptions for the admin and manufacturer
//! dashboards.

pub mod catalog;
pub mod desk;
pub mod jobs;
pub mod partnership;
pub mod prefill;
pub mod quote;

mod notify;
mod validate;

pub use catalog::CatalogRequestForm;
pub use desk::{DeskError, LeadDesk};
pub use jobs::{JobApplicationForm, ResumeUpload};
pub use partnership::PartnershipForm;
pub use prefill::Prefill;
pub use quote::{QuoteDraft, QuoteStep};
