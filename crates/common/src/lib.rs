pub mod api;
pub mod error;
pub mod ids;
pub mod types;

pub use error::{BillingError, Result};
pub use ids::InvoiceId;
