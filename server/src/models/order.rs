// server/src/models/order.rs

use bookwell::domain::Order;
use bookwell::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub service_id: Uuid,
  pub package_id: Option<Uuid>,
  pub description: Option<String>,
  pub attached_file_path: Option<String>,
  pub date: Option<NaiveDate>,
  pub date_count: Option<i32>,
  pub status: String,
  pub reminder_sent: bool,
  pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = BookingError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    Ok(Order {
      id: row.id,
      customer_id: row.customer_id,
      service_id: row.service_id,
      package_id: row.package_id,
      description: row.description,
      attached_file_path: row.attached_file_path,
      date: row.date,
      date_count: row.date_count,
      status: parse_column(&row.status)?,
      reminder_sent: row.reminder_sent,
      created_at: row.created_at,
    })
  }
}
