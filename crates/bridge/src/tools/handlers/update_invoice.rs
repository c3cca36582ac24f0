use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use billing_common::types::InvoiceUpdate;
use billing_common::InvoiceId;

use crate::tools::handlers::store_err;
use crate::tools::registry::{ToolHandler, ToolHandlerContext};
use crate::tools::ToolError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    invoice_id: String,
    /// Typed partial update; unknown field names are rejected, not ignored.
    fields: InvoiceUpdate,
}

pub fn handler() -> ToolHandler {
    Arc::new(|args: Value, ctx: Arc<ToolHandlerContext>| {
        Box::pin(async move {
            let args: Args = serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

            if args.fields.amount.is_some_and(|a| a < 0.0) {
                return Err(ToolError::InvalidArguments(
                    "amount must not be negative".to_string(),
                ));
            }

            let invoice = ctx
                .store
                .update_invoice(&InvoiceId::from(args.invoice_id), &args.fields)
                .await
                .map_err(store_err)?;

            serde_json::to_value(&invoice).map_err(|e| ToolError::Internal(e.to_string()))
        })
    })
}
