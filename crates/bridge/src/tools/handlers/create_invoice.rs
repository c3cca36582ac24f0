use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use billing_common::types::{InvoiceStatus, NewInvoice};

use crate::tools::handlers::store_err;
use crate::tools::registry::{ToolHandler, ToolHandlerContext};
use crate::tools::ToolError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    customer_id: String,
    amount: f64,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    status: Option<InvoiceStatus>,
    #[serde(default)]
    pdf_url: Option<String>,
}

pub fn handler() -> ToolHandler {
    Arc::new(|args: Value, ctx: Arc<ToolHandlerContext>| {
        Box::pin(async move {
            let args: Args = serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

            if args.amount < 0.0 {
                return Err(ToolError::InvalidArguments(
                    "amount must not be negative".to_string(),
                ));
            }
            if let Some(ref currency) = args.currency {
                if currency.len() != 3 {
                    return Err(ToolError::InvalidArguments(
                        "currency must be a 3-letter code".to_string(),
                    ));
                }
            }

            let invoice = ctx
                .store
                .create_invoice(&NewInvoice {
                    customer_id: args.customer_id,
                    amount: args.amount,
                    currency: args.currency,
                    status: args.status,
                    pdf_url: args.pdf_url,
                })
                .await
                .map_err(store_err)?;

            serde_json::to_value(&invoice).map_err(|e| ToolError::Internal(e.to_string()))
        })
    })
}
