// server/src/db/reservations.rs

use async_trait::async_trait;
use bookwell::domain::{Reservation, ReservationSpec};
use bookwell::ports::ReservationStore;
use bookwell::{BookingError, BookingResult};
use uuid::Uuid;

use super::{db_err, PgStore};
use crate::models::reservation::period_kind;
use crate::models::ReservationRow;

const COLUMNS: &str = "id, order_id, kind, start_date, end_date, status, created_at";

#[async_trait]
impl ReservationStore for PgStore {
  async fn insert(&self, spec: &ReservationSpec) -> BookingResult<Reservation> {
    let row: Option<ReservationRow> = sqlx::query_as(&format!(
      "INSERT INTO reservations (id, order_id, kind, start_date, end_date, status) \
       VALUES ($1, $2, $3, $4, $5, $6) \
       ON CONFLICT (order_id) DO NOTHING RETURNING {}",
      COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(spec.order_id)
    .bind(period_kind(&spec.period))
    .bind(spec.period.start())
    .bind(spec.period.end())
    .bind(spec.status.as_str())
    .fetch_optional(self.pool())
    .await
    .map_err(db_err)?;

    row
      .ok_or_else(|| BookingError::Conflict(format!("Reservation for order {} already exists", spec.order_id)))?
      .try_into()
  }

  async fn find_by_order(&self, order_id: Uuid) -> BookingResult<Option<Reservation>> {
    let row: Option<ReservationRow> =
      sqlx::query_as(&format!("SELECT {} FROM reservations WHERE order_id = $1", COLUMNS))
        .bind(order_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
    row.map(Reservation::try_from).transpose()
  }
}
