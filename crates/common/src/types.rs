use serde::{Deserialize, Serialize};

use crate::ids::InvoiceId;

/// Payment state of an invoice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    /// Returns the string representation stored in SQLite.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }

    /// Parse a stored status string; `None` for values outside the enum.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "paid" => Some(Self::Paid),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        Self::Unpaid
    }
}

/// An invoice record as persisted in the store and returned by tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: InvoiceId,
    pub customer_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    /// Link to the rendered PDF, if one exists.
    pub pdf_url: Option<String>,
}

/// Fields for creating an invoice. The id is generated by the store when
/// not supplied.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

/// Partial update for an invoice. `None` fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl InvoiceUpdate {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.status.is_none()
            && self.pdf_url.is_none()
    }
}
