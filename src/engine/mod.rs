//! Reconciliation engine: concurrent fetch, merge, price selection and
//! opportunity detection for one sport per pass.

pub mod reconciler;
pub mod report;

pub use reconciler::Reconciler;
pub use report::{Diagnostics, EventPrices, ProviderFailure, ReconciliationReport};
