mod create_invoice;
mod delete_invoice;
mod download_invoice_pdf;
mod get_invoice;
mod list_invoices;
mod search_invoices;
mod update_invoice;

use crate::store::StoreError;
use crate::tools::{ToolError, ToolRegistry};

/// Register all billing tool handlers with the registry.
///
/// Tool names match what the remote MCP billing server exposes, so a
/// caller's request works identically on either dispatch path.
pub fn register_billing_tools(registry: &mut ToolRegistry) {
    registry.register("get_invoice", get_invoice::handler());
    registry.register("list_invoices", list_invoices::handler());
    registry.register("create_invoice_tool", create_invoice::handler());
    registry.register("update_invoice_tool", update_invoice::handler());
    registry.register("delete_invoice_tool", delete_invoice::handler());
    registry.register("search_invoices_tool", search_invoices::handler());
    registry.register("download_invoice_pdf", download_invoice_pdf::handler());
}

/// Translate store failures into caller-facing tool errors. A missing
/// record is a business condition, everything else is opaque.
fn store_err(e: StoreError) -> ToolError {
    match e {
        StoreError::NotFound(_) => ToolError::NotFound("Invoice not found".to_string()),
        StoreError::Validation(msg) => ToolError::InvalidArguments(msg),
        other => ToolError::Internal(other.to_string()),
    }
}
