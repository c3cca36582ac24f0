//! Integration tests for the invoice store, run against in-memory SQLite.
//!
//! Setup: each test gets a fresh single-connection pool and runs the
//! embedded migrations, so tests are fully isolated.

use billing_bridge::store::{StoreClient, StoreError};
use billing_common::types::{InvoiceStatus, InvoiceUpdate, NewInvoice};
use billing_common::InvoiceId;

async fn setup() -> StoreClient {
    // One connection so the in-memory database is shared across queries.
    let store = StoreClient::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory SQLite");

    store.migrate().await.expect("Failed to run migrations");
    store
}

fn assert_generated_id_shape(id: &InvoiceId) {
    let s = id.as_str();
    assert!(s.starts_with("INV-"), "unexpected id prefix: {}", s);
    let suffix = &s[4..];
    assert_eq!(suffix.len(), 8, "unexpected id length: {}", s);
    assert!(
        suffix
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()),
        "id suffix is not uppercase hex: {}",
        s
    );
}

// -----------------------------------------------------------------------
// 1. Create
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_create_generates_id_and_applies_fields() {
    let store = setup().await;

    let invoice = store
        .create_invoice(&NewInvoice {
            customer_id: "CUST-1".into(),
            amount: 120.5,
            currency: Some("USD".into()),
            status: Some(InvoiceStatus::Paid),
            pdf_url: None,
        })
        .await
        .unwrap();

    assert_generated_id_shape(&invoice.invoice_id);
    assert_eq!(invoice.customer_id, "CUST-1");
    assert_eq!(invoice.amount, 120.5);
    assert_eq!(invoice.currency, "USD");
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.pdf_url, None);

    // The row is durably readable after create returns.
    let fetched = store.get_invoice(&invoice.invoice_id).await.unwrap();
    assert_eq!(fetched.amount, 120.5);
    assert_eq!(fetched.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_create_defaults_currency_and_status() {
    let store = setup().await;

    let invoice = store
        .create_invoice(&NewInvoice {
            customer_id: "CUST-9".into(),
            amount: 10.0,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(invoice.currency, "USD");
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
}

#[tokio::test]
async fn test_create_rejects_negative_amount() {
    let store = setup().await;

    let err = store
        .create_invoice(&NewInvoice {
            customer_id: "CUST-1".into(),
            amount: -5.0,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn test_generated_ids_are_pairwise_distinct() {
    let store = setup().await;
    let mut seen = std::collections::HashSet::new();

    for _ in 0..50 {
        let invoice = store
            .create_invoice(&NewInvoice {
                customer_id: "CUST-1".into(),
                amount: 1.0,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(
            seen.insert(invoice.invoice_id.clone()),
            "duplicate id {}",
            invoice.invoice_id
        );
    }
}

// -----------------------------------------------------------------------
// 2. Get / list
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_get_absent_invoice_is_not_found() {
    let store = setup().await;

    let err = store
        .get_invoice(&InvoiceId::from("INV-DOESNOTEXIST"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_list_for_customer_returns_exactly_their_invoices() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    let invoices = store.list_for_customer("CUST-1").await.unwrap();
    let ids: Vec<&str> = invoices.iter().map(|i| i.invoice_id.as_str()).collect();
    assert_eq!(ids, vec!["INV-123", "INV-124"]);

    let invoices = store.list_for_customer("CUST-2").await.unwrap();
    let ids: Vec<&str> = invoices.iter().map(|i| i.invoice_id.as_str()).collect();
    assert_eq!(ids, vec!["INV-125"]);

    assert!(store.list_for_customer("CUST-404").await.unwrap().is_empty());
}

// -----------------------------------------------------------------------
// 3. Partial update
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_update_merges_only_supplied_fields() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    let before = store.get_invoice(&InvoiceId::from("INV-123")).await.unwrap();
    assert_eq!(before.status, InvoiceStatus::Paid);

    let updated = store
        .update_invoice(
            &InvoiceId::from("INV-123"),
            &InvoiceUpdate {
                status: Some(InvoiceStatus::Unpaid),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, InvoiceStatus::Unpaid);
    assert_eq!(updated.amount, before.amount);
    assert_eq!(updated.currency, before.currency);
    assert_eq!(updated.customer_id, before.customer_id);
    assert_eq!(updated.pdf_url, before.pdf_url);

    // The merge is visible on a fresh read.
    let after = store.get_invoice(&InvoiceId::from("INV-123")).await.unwrap();
    assert_eq!(after.status, InvoiceStatus::Unpaid);
    assert_eq!(after.amount, before.amount);
}

#[tokio::test]
async fn test_update_absent_invoice_is_not_found() {
    let store = setup().await;

    let err = store
        .update_invoice(
            &InvoiceId::from("INV-404"),
            &InvoiceUpdate {
                amount: Some(1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_update_rejects_negative_amount() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    let err = store
        .update_invoice(
            &InvoiceId::from("INV-123"),
            &InvoiceUpdate {
                amount: Some(-1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    // The record is untouched.
    let invoice = store.get_invoice(&InvoiceId::from("INV-123")).await.unwrap();
    assert_eq!(invoice.amount, 120.5);
}

#[tokio::test]
async fn test_empty_update_returns_record_unchanged() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    let invoice = store
        .update_invoice(&InvoiceId::from("INV-124"), &InvoiceUpdate::default())
        .await
        .unwrap();
    assert_eq!(invoice.amount, 200.0);
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
}

// -----------------------------------------------------------------------
// 4. Delete
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_delete_signals_existence() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    assert!(store.delete_invoice(&InvoiceId::from("INV-126")).await.unwrap());

    // Idempotence signal: a second delete is false, never an error.
    assert!(!store.delete_invoice(&InvoiceId::from("INV-126")).await.unwrap());

    let err = store
        .get_invoice(&InvoiceId::from("INV-126"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

// -----------------------------------------------------------------------
// 5. Search
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_search_matches_id_and_customer_substrings() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    let ids: Vec<String> = store
        .search_invoices("INV-12")
        .await
        .unwrap()
        .iter()
        .map(|i| i.invoice_id.to_string())
        .collect();
    assert!(ids.contains(&"INV-123".to_string()));
    assert!(ids.contains(&"INV-124".to_string()));
    assert!(ids.contains(&"INV-125".to_string()));
    assert!(!ids.contains(&"INV-200".to_string()));

    // Customer id substrings match too.
    let hits = store.search_invoices("CUST-2").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].invoice_id.as_str(), "INV-125");
}

#[tokio::test]
async fn test_search_is_case_sensitive() {
    let store = setup().await;
    store.seed_demo().await.unwrap();

    assert!(store.search_invoices("inv-12").await.unwrap().is_empty());
    assert!(store.search_invoices("cust-1").await.unwrap().is_empty());
}
