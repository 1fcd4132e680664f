// server/src/db/orders.rs

use async_trait::async_trait;
use bookwell::domain::{NewOrder, Order, OrderStatus};
use bookwell::ports::OrderStore;
use bookwell::{BookingError, BookingResult};
use chrono::NaiveDate;
use uuid::Uuid;

use super::{db_err, PgStore};
use crate::models::{parse_column, OrderRow};

const COLUMNS: &str = "id, customer_id, service_id, package_id, description, attached_file_path, date, date_count, \
                       status, reminder_sent, created_at";

#[async_trait]
impl OrderStore for PgStore {
  async fn insert(&self, order: NewOrder) -> BookingResult<Order> {
    let row: OrderRow = sqlx::query_as(&format!(
      "INSERT INTO orders (id, customer_id, service_id, package_id, description, attached_file_path, date, \
       date_count, status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(order.customer_id)
    .bind(order.service_id)
    .bind(order.package_id)
    .bind(order.description)
    .bind(order.attached_file_path)
    .bind(order.date)
    .bind(order.date_count)
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(self.pool())
    .await
    .map_err(db_err)?;
    row.try_into()
  }

  async fn get(&self, order_id: Uuid) -> BookingResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", COLUMNS))
      .bind(order_id)
      .fetch_optional(self.pool())
      .await
      .map_err(db_err)?;
    row.map(Order::try_from).transpose()
  }

  async fn mark_paid(&self, order_id: Uuid) -> BookingResult<bool> {
    let moved = sqlx::query("UPDATE orders SET status = 'paid' WHERE id = $1 AND status = 'pending'")
      .bind(order_id)
      .execute(self.pool())
      .await
      .map_err(db_err)?
      .rows_affected();
    if moved == 1 {
      return Ok(true);
    }

    let current: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
      .bind(order_id)
      .fetch_optional(self.pool())
      .await
      .map_err(db_err)?;
    let status: OrderStatus = match current {
      Some(raw) => parse_column(&raw)?,
      None => return Err(BookingError::not_found("order", order_id)),
    };
    if status.is_settled() {
      return Ok(false);
    }
    status.ensure_transition(OrderStatus::Paid)?;
    Ok(false)
  }

  async fn due_for_reminder(&self, from: NaiveDate, to: NaiveDate) -> BookingResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders \
       WHERE status IN ('paid', 'confirmed') AND reminder_sent = FALSE AND date BETWEEN $1 AND $2 \
       ORDER BY date",
      COLUMNS
    ))
    .bind(from)
    .bind(to)
    .fetch_all(self.pool())
    .await
    .map_err(db_err)?;
    rows.into_iter().map(Order::try_from).collect()
  }

  async fn claim_reminder(&self, order_id: Uuid) -> BookingResult<bool> {
    let claimed = sqlx::query("UPDATE orders SET reminder_sent = TRUE WHERE id = $1 AND reminder_sent = FALSE")
      .bind(order_id)
      .execute(self.pool())
      .await
      .map_err(db_err)?
      .rows_affected();
    Ok(claimed == 1)
  }

  async fn release_reminder(&self, order_id: Uuid) -> BookingResult<()> {
    sqlx::query("UPDATE orders SET reminder_sent = FALSE WHERE id = $1")
      .bind(order_id)
      .execute(self.pool())
      .await
      .map_err(db_err)?;
    Ok(())
  }
}
