use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use billing_common::InvoiceId;

use crate::tools::handlers::store_err;
use crate::tools::registry::{ToolHandler, ToolHandlerContext};
use crate::tools::ToolError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    invoice_id: String,
}

pub fn handler() -> ToolHandler {
    Arc::new(|args: Value, ctx: Arc<ToolHandlerContext>| {
        Box::pin(async move {
            let args: Args = serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

            let invoice = ctx
                .store
                .get_invoice(&InvoiceId::from(args.invoice_id))
                .await
                .map_err(store_err)?;

            match invoice.pdf_url {
                Some(url) => Ok(json!({ "pdf_url": url })),
                None => Err(ToolError::NotFound("Invoice or PDF not found".to_string())),
            }
        })
    })
}
