use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::tools::handlers::store_err;
use crate::tools::registry::{ToolHandler, ToolHandlerContext};
use crate::tools::ToolError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    q: String,
}

pub fn handler() -> ToolHandler {
    Arc::new(|args: Value, ctx: Arc<ToolHandlerContext>| {
        Box::pin(async move {
            let args: Args = serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

            let invoices = ctx.store.search_invoices(&args.q).await.map_err(store_err)?;

            serde_json::to_value(&invoices).map_err(|e| ToolError::Internal(e.to_string()))
        })
    })
}
