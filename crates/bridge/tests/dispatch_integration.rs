//! Integration tests for the dual-path dispatcher and the local tool
//! registry, run against in-memory SQLite.
//!
//! The remote path is forced to fail by pointing the dispatcher at an
//! unroutable endpoint; callers must never see the transport failure.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use billing_bridge::breaker::CircuitBreaker;
use billing_bridge::dispatch::{RemoteEndpoint, ToolDispatcher};
use billing_bridge::store::StoreClient;
use billing_bridge::tools::handlers::register_billing_tools;
use billing_bridge::tools::{ToolError, ToolHandlerContext, ToolRegistry};

/// Nothing listens on port 1; connections are refused immediately.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1/mcp";

async fn seeded_registry() -> ToolRegistry {
    let store = StoreClient::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory SQLite");
    store.migrate().await.expect("Failed to run migrations");
    store.seed_demo().await.expect("Failed to seed demo data");

    let mut registry = ToolRegistry::new(ToolHandlerContext {
        store: Arc::new(store),
    });
    register_billing_tools(&mut registry);
    registry
}

async fn local_dispatcher() -> ToolDispatcher {
    ToolDispatcher::new(seeded_registry().await, None)
}

async fn dead_remote_dispatcher(breaker: Option<CircuitBreaker>) -> ToolDispatcher {
    ToolDispatcher::new(
        seeded_registry().await,
        Some(RemoteEndpoint {
            url: DEAD_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
            breaker,
        }),
    )
}

// -----------------------------------------------------------------------
// 1. Local path
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_local_get_invoice() {
    let dispatcher = local_dispatcher().await;

    let result = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-123" }))
        .await
        .unwrap();

    assert_eq!(result["invoice_id"], "INV-123");
    assert_eq!(result["customer_id"], "CUST-1");
    assert_eq!(result["amount"], 120.5);
    assert_eq!(result["status"], "paid");
}

#[tokio::test]
async fn test_unknown_tool_is_a_distinct_error() {
    let dispatcher = local_dispatcher().await;

    let err = dispatcher
        .dispatch("nonexistent_tool", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "nonexistent_tool"));
}

#[tokio::test]
async fn test_missing_record_is_a_business_error() {
    let dispatcher = local_dispatcher().await;

    let err = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-999" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(ref msg) if msg == "Invoice not found"));
}

#[tokio::test]
async fn test_unknown_argument_fields_are_rejected() {
    let dispatcher = local_dispatcher().await;

    let err = dispatcher
        .dispatch(
            "get_invoice",
            json!({ "invoice_id": "INV-123", "extra": true }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));

    // Same policy inside the update field set.
    let err = dispatcher
        .dispatch(
            "update_invoice_tool",
            json!({ "invoice_id": "INV-123", "fields": { "status": "paid", "surprise": 1 } }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn test_negative_amount_is_rejected_before_store_access() {
    let dispatcher = local_dispatcher().await;

    let err = dispatcher
        .dispatch(
            "create_invoice_tool",
            json!({ "customer_id": "CUST-1", "amount": -5.0 }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn test_update_then_get_round_trip() {
    let dispatcher = local_dispatcher().await;

    let updated = dispatcher
        .dispatch(
            "update_invoice_tool",
            json!({ "invoice_id": "INV-123", "fields": { "status": "unpaid" } }),
        )
        .await
        .unwrap();
    assert_eq!(updated["status"], "unpaid");
    assert_eq!(updated["amount"], 120.5);

    let fetched = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-123" }))
        .await
        .unwrap();
    assert_eq!(fetched["status"], "unpaid");
    assert_eq!(fetched["amount"], 120.5);
}

#[tokio::test]
async fn test_delete_tool_reports_existence() {
    let dispatcher = local_dispatcher().await;

    let result = dispatcher
        .dispatch("delete_invoice_tool", json!({ "invoice_id": "INV-126" }))
        .await
        .unwrap();
    assert_eq!(result, json!({ "deleted": true }));

    let result = dispatcher
        .dispatch("delete_invoice_tool", json!({ "invoice_id": "INV-126" }))
        .await
        .unwrap();
    assert_eq!(result, json!({ "deleted": false }));
}

#[tokio::test]
async fn test_download_pdf_returns_stored_url() {
    let dispatcher = local_dispatcher().await;

    let result = dispatcher
        .dispatch("download_invoice_pdf", json!({ "invoice_id": "INV-123" }))
        .await
        .unwrap();
    assert_eq!(
        result,
        json!({ "pdf_url": "https://files.local/invoices/INV-123.pdf" })
    );
}

// -----------------------------------------------------------------------
// 2. Remote failure → local fallback
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_unreachable_remote_falls_back_transparently() {
    let dispatcher = dead_remote_dispatcher(None).await;

    // The caller sees the record, not the transport failure.
    let result = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-123" }))
        .await
        .unwrap();
    assert_eq!(result["invoice_id"], "INV-123");
    assert_eq!(result["amount"], 120.5);
}

#[tokio::test]
async fn test_fallback_produces_same_result_as_local_path() {
    let local = local_dispatcher().await;
    let fallback = dead_remote_dispatcher(None).await;

    for (tool, args) in [
        ("get_invoice", json!({ "invoice_id": "INV-124" })),
        ("list_invoices", json!({ "customer_id": "CUST-1" })),
        ("search_invoices_tool", json!({ "q": "INV-12" })),
    ] {
        let a: Value = local.dispatch(tool, args.clone()).await.unwrap();
        let b: Value = fallback.dispatch(tool, args).await.unwrap();
        assert_eq!(a, b, "tool {} diverged between paths", tool);
    }
}

#[tokio::test]
async fn test_business_errors_survive_fallback() {
    let dispatcher = dead_remote_dispatcher(None).await;

    let err = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-999" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(_)));

    let err = dispatcher.dispatch("nonexistent_tool", json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(_)));
}

#[tokio::test]
async fn test_open_breaker_skips_remote_and_still_serves() {
    let dispatcher = dead_remote_dispatcher(Some(CircuitBreaker::new("mcp_transport", 1, 600))).await;

    // First call fails remotely, falls back, and trips the breaker.
    let result = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-125" }))
        .await
        .unwrap();
    assert_eq!(result["invoice_id"], "INV-125");

    // Subsequent calls skip the dead endpoint entirely and still succeed.
    let result = dispatcher
        .dispatch("get_invoice", json!({ "invoice_id": "INV-125" }))
        .await
        .unwrap();
    assert_eq!(result["invoice_id"], "INV-125");
}
