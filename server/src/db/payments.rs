// server/src/db/payments.rs

use async_trait::async_trait;
use bookwell::domain::{NewPayment, Payment, PaymentStatus, Settlement};
use bookwell::ports::{CheckoutSession, PaymentStore};
use bookwell::{BookingError, BookingResult};
use serde_json::json;
use uuid::Uuid;

use super::{db_err, PgStore};
use crate::models::PaymentRow;

const COLUMNS: &str = "id, order_id, amount, payment_option, status, reference, provider_transaction_id, metadata, \
                       created_at, updated_at";

#[async_trait]
impl PaymentStore for PgStore {
  async fn insert_pending(&self, payment: NewPayment) -> BookingResult<Payment> {
    let row: PaymentRow = sqlx::query_as(&format!(
      "INSERT INTO payments (id, order_id, amount, payment_option, status, reference) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(&payment.payment_option)
    .bind(PaymentStatus::Pending.as_str())
    .bind(&payment.reference)
    .fetch_one(self.pool())
    .await
    .map_err(db_err)?;
    row.try_into()
  }

  async fn attach_checkout(&self, payment_id: Uuid, checkout: &CheckoutSession) -> BookingResult<Payment> {
    let patch = json!({
      "checkoutUrl": checkout.redirect_url,
      "providerReference": checkout.provider_reference,
    });
    let row: Option<PaymentRow> = sqlx::query_as(&format!(
      "UPDATE payments SET metadata = metadata || $2, updated_at = now() \
       WHERE id = $1 AND status = 'pending' RETURNING {}",
      COLUMNS
    ))
    .bind(payment_id)
    .bind(patch)
    .fetch_optional(self.pool())
    .await
    .map_err(db_err)?;
    row
      .ok_or_else(|| BookingError::Conflict(format!("Payment {} is missing or no longer pending", payment_id)))?
      .try_into()
  }

  async fn discard_pending(&self, payment_id: Uuid) -> BookingResult<()> {
    sqlx::query("DELETE FROM payments WHERE id = $1 AND status = 'pending'")
      .bind(payment_id)
      .execute(self.pool())
      .await
      .map_err(db_err)?;
    Ok(())
  }

  async fn find_by_reference(&self, reference: &str) -> BookingResult<Option<Payment>> {
    let row: Option<PaymentRow> = sqlx::query_as(&format!("SELECT {} FROM payments WHERE reference = $1", COLUMNS))
      .bind(reference)
      .fetch_optional(self.pool())
      .await
      .map_err(db_err)?;
    row.map(Payment::try_from).transpose()
  }

  async fn settle_if_pending(&self, reference: &str, settlement: &Settlement) -> BookingResult<Option<Payment>> {
    let row: Option<PaymentRow> = sqlx::query_as(&format!(
      "UPDATE payments \
       SET status = $2, \
           provider_transaction_id = COALESCE($3, provider_transaction_id), \
           metadata = metadata || $4, \
           updated_at = now() \
       WHERE reference = $1 AND status = 'pending' RETURNING {}",
      COLUMNS
    ))
    .bind(reference)
    .bind(settlement.status.as_str())
    .bind(settlement.provider_transaction_id.as_deref())
    .bind(&settlement.metadata)
    .fetch_optional(self.pool())
    .await
    .map_err(db_err)?;
    row.map(Payment::try_from).transpose()
  }

  async fn completed_without_reservation(&self, limit: usize) -> BookingResult<Vec<Payment>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows: Vec<PaymentRow> = sqlx::query_as(
      "SELECT p.id, p.order_id, p.amount, p.payment_option, p.status, p.reference, p.provider_transaction_id, \
              p.metadata, p.created_at, p.updated_at \
       FROM payments p \
       JOIN orders o ON o.id = p.order_id \
       LEFT JOIN reservations r ON r.order_id = o.id \
       WHERE p.status = 'completed' \
         AND (o.status = 'pending' \
              OR (o.status <> 'cancelled' AND o.date IS NOT NULL AND r.id IS NULL)) \
       ORDER BY p.created_at \
       LIMIT $1",
    )
    .bind(limit)
    .fetch_all(self.pool())
    .await
    .map_err(db_err)?;
    rows.into_iter().map(Payment::try_from).collect()
  }
}
