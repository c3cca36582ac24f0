use billing_common::ids::InvoiceId;
use billing_common::types::{Invoice, InvoiceStatus, InvoiceUpdate, NewInvoice};

use super::{StoreClient, StoreError};

/// Attempts at generating a non-colliding invoice id before giving up.
const ID_GENERATION_ATTEMPTS: u32 = 3;

impl StoreClient {
    /// Retrieve an invoice by id.
    pub async fn get_invoice(&self, id: &InvoiceId) -> Result<Invoice, StoreError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, customer_id, amount, currency, status, pdf_url
            FROM invoices
            WHERE invoice_id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
        .ok_or_else(|| StoreError::NotFound(format!("Invoice {}", id)))?;

        Ok(row.into())
    }

    /// All invoices belonging to a customer, in stable id order.
    pub async fn list_for_customer(&self, customer_id: &str) -> Result<Vec<Invoice>, StoreError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, customer_id, amount, currency, status, pdf_url
            FROM invoices
            WHERE customer_id = ?
            ORDER BY invoice_id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a new invoice with a freshly generated id.
    ///
    /// A primary-key collision triggers regeneration of the id; after
    /// `ID_GENERATION_ATTEMPTS` collisions the call fails explicitly
    /// rather than overwriting an existing row.
    pub async fn create_invoice(&self, new: &NewInvoice) -> Result<Invoice, StoreError> {
        if new.amount < 0.0 {
            return Err(StoreError::Validation(format!(
                "amount must not be negative, got {}",
                new.amount
            )));
        }

        let mut invoice = Invoice {
            invoice_id: InvoiceId::generate(),
            customer_id: new.customer_id.clone(),
            amount: new.amount,
            currency: new.currency.clone().unwrap_or_else(|| "USD".to_string()),
            status: new.status.unwrap_or_default(),
            pdf_url: new.pdf_url.clone(),
        };
        for attempt in 1..=ID_GENERATION_ATTEMPTS {
            let result = sqlx::query(
                r#"
                INSERT INTO invoices (invoice_id, customer_id, amount, currency, status, pdf_url)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(invoice.invoice_id.as_str())
            .bind(&invoice.customer_id)
            .bind(invoice.amount)
            .bind(&invoice.currency)
            .bind(invoice.status.as_db_str())
            .bind(&invoice.pdf_url)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => return Ok(invoice),
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(
                        invoice_id = %invoice.invoice_id,
                        attempt,
                        "Invoice id collision, regenerating"
                    );
                    invoice.invoice_id = InvoiceId::generate();
                }
                Err(e) => return Err(StoreError::Query(e.to_string())),
            }
        }

        Err(StoreError::IdCollision(ID_GENERATION_ATTEMPTS))
    }

    /// Merge the supplied fields into an existing invoice and return the
    /// full updated record. Fields left `None` are untouched. The merge is
    /// a single UPDATE statement, so it applies fully or not at all.
    pub async fn update_invoice(
        &self,
        id: &InvoiceId,
        update: &InvoiceUpdate,
    ) -> Result<Invoice, StoreError> {
        if update.amount.is_some_and(|a| a < 0.0) {
            return Err(StoreError::Validation(
                "amount must not be negative".to_string(),
            ));
        }

        if update.is_empty() {
            return self.get_invoice(id).await;
        }

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = COALESCE(?, customer_id),
                amount      = COALESCE(?, amount),
                currency    = COALESCE(?, currency),
                status      = COALESCE(?, status),
                pdf_url     = COALESCE(?, pdf_url)
            WHERE invoice_id = ?
            "#,
        )
        .bind(update.customer_id.as_deref())
        .bind(update.amount)
        .bind(update.currency.as_deref())
        .bind(update.status.map(|s| s.as_db_str()))
        .bind(update.pdf_url.as_deref())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Invoice {}", id)));
        }

        self.get_invoice(id).await
    }

    /// Delete an invoice. Returns whether a row existed and was removed;
    /// deleting an absent id is not an error.
    pub async fn delete_invoice(&self, id: &InvoiceId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM invoices WHERE invoice_id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Invoices whose id or customer id contains `q` as a substring.
    ///
    /// Uses `instr()` rather than LIKE: SQLite's LIKE is case-insensitive
    /// for ASCII, and the match here is case-sensitive.
    pub async fn search_invoices(&self, q: &str) -> Result<Vec<Invoice>, StoreError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, customer_id, amount, currency, status, pdf_url
            FROM invoices
            WHERE instr(invoice_id, ?) > 0 OR instr(customer_id, ?) > 0
            ORDER BY invoice_id
            "#,
        )
        .bind(q)
        .bind(q)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Idempotently insert the demo invoice set used by local development
    /// and the integration tests.
    pub async fn seed_demo(&self) -> Result<(), StoreError> {
        let demo: [(&str, &str, f64, &str, &str); 4] = [
            ("INV-123", "CUST-1", 120.5, "USD", "paid"),
            ("INV-124", "CUST-1", 200.0, "USD", "unpaid"),
            ("INV-125", "CUST-2", 75.25, "USD", "paid"),
            ("INV-126", "CUST-3", 450.0, "USD", "unpaid"),
        ];

        for (invoice_id, customer_id, amount, currency, status) in demo {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO invoices (invoice_id, customer_id, amount, currency, status, pdf_url)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(invoice_id)
            .bind(customer_id)
            .bind(amount)
            .bind(currency)
            .bind(status)
            .bind(format!("https://files.local/invoices/{}.pdf", invoice_id))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        }

        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// Internal row type for sqlx deserialization.
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    invoice_id: String,
    customer_id: String,
    amount: f64,
    currency: String,
    status: String,
    pdf_url: Option<String>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        let status = InvoiceStatus::from_db_str(&row.status).unwrap_or_else(|| {
            tracing::warn!(
                invoice_id = %row.invoice_id,
                status = %row.status,
                "Unknown invoice status in store, defaulting to unpaid"
            );
            InvoiceStatus::Unpaid
        });

        Self {
            invoice_id: InvoiceId::from(row.invoice_id),
            customer_id: row.customer_id,
            amount: row.amount,
            currency: row.currency,
            status,
            pdf_url: row.pdf_url,
        }
    }
}
