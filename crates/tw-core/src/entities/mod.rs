//! Lead entity structs stored in the hosted data store.

mod catalog;
mod job;
mod partnership;
mod quote;

pub use catalog::CatalogRequest;
pub use job::JobApplication;
pub use partnership::PartnershipApplication;
pub use quote::{QuoteProduct, QuoteRequest, ShipmentDetails};
