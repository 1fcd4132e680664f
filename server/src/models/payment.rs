// server/src/models/payment.rs

use bookwell::domain::Payment;
use bookwell::BookingError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub amount: Decimal,
  pub payment_option: String,
  pub status: String,
  pub reference: String,
  pub provider_transaction_id: Option<String>,
  pub metadata: JsonValue,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
  type Error = BookingError;

  fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
    Ok(Payment {
      id: row.id,
      order_id: row.order_id,
      amount: row.amount,
      payment_option: row.payment_option,
      status: parse_column(&row.status)?,
      reference: row.reference,
      provider_transaction_id: row.provider_transaction_id,
      metadata: row.metadata,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}
