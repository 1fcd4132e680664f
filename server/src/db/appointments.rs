// server/src/db/appointments.rs

use async_trait::async_trait;
use bookwell::domain::{Appointment, AppointmentStatus, NewAppointment};
use bookwell::ports::AppointmentStore;
use bookwell::BookingResult;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{db_err, PgStore};
use crate::models::AppointmentRow;

const COLUMNS: &str = "id, customer_id, date_time, hospital_name, status, reminder_sent, follow_up_sent, created_at";

impl PgStore {
  async fn appointments_where(
    &self,
    condition: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> BookingResult<Vec<Appointment>> {
    let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
      "SELECT {} FROM appointments WHERE {} AND date_time BETWEEN $1 AND $2 ORDER BY date_time",
      COLUMNS, condition
    ))
    .bind(from)
    .bind(to)
    .fetch_all(self.pool())
    .await
    .map_err(db_err)?;
    rows.into_iter().map(Appointment::try_from).collect()
  }

  /// `column` is one of the two flag columns, never user input.
  async fn set_flag(&self, appointment_id: Uuid, column: &str, value: bool) -> BookingResult<bool> {
    let changed = sqlx::query(&format!(
      "UPDATE appointments SET {col} = $2 WHERE id = $1 AND {col} = NOT $2",
      col = column
    ))
    .bind(appointment_id)
    .bind(value)
    .execute(self.pool())
    .await
    .map_err(db_err)?
    .rows_affected();
    Ok(changed == 1)
  }
}

#[async_trait]
impl AppointmentStore for PgStore {
  async fn insert(&self, appointment: NewAppointment) -> BookingResult<Appointment> {
    let row: AppointmentRow = sqlx::query_as(&format!(
      "INSERT INTO appointments (id, customer_id, date_time, hospital_name, status) \
       VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(appointment.customer_id)
    .bind(appointment.date_time)
    .bind(appointment.hospital_name.trim())
    .bind(AppointmentStatus::Pending.as_str())
    .fetch_one(self.pool())
    .await
    .map_err(db_err)?;
    row.try_into()
  }

  async fn get(&self, appointment_id: Uuid) -> BookingResult<Option<Appointment>> {
    let row: Option<AppointmentRow> = sqlx::query_as(&format!("SELECT {} FROM appointments WHERE id = $1", COLUMNS))
      .bind(appointment_id)
      .fetch_optional(self.pool())
      .await
      .map_err(db_err)?;
    row.map(Appointment::try_from).transpose()
  }

  async fn update_status(
    &self,
    appointment_id: Uuid,
    expected: AppointmentStatus,
    next: AppointmentStatus,
  ) -> BookingResult<Option<Appointment>> {
    let row: Option<AppointmentRow> = sqlx::query_as(&format!(
      "UPDATE appointments SET status = $3 WHERE id = $1 AND status = $2 RETURNING {}",
      COLUMNS
    ))
    .bind(appointment_id)
    .bind(expected.as_str())
    .bind(next.as_str())
    .fetch_optional(self.pool())
    .await
    .map_err(db_err)?;
    row.map(Appointment::try_from).transpose()
  }

  async fn due_for_reminder(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Vec<Appointment>> {
    self
      .appointments_where("status = 'confirmed' AND reminder_sent = FALSE", from, to)
      .await
  }

  async fn due_for_follow_up(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Vec<Appointment>> {
    self
      .appointments_where("status = 'completed' AND follow_up_sent = FALSE", from, to)
      .await
  }

  async fn claim_reminder(&self, appointment_id: Uuid) -> BookingResult<bool> {
    self.set_flag(appointment_id, "reminder_sent", true).await
  }

  async fn release_reminder(&self, appointment_id: Uuid) -> BookingResult<()> {
    self.set_flag(appointment_id, "reminder_sent", false).await.map(|_| ())
  }

  async fn claim_follow_up(&self, appointment_id: Uuid) -> BookingResult<bool> {
    self.set_flag(appointment_id, "follow_up_sent", true).await
  }

  async fn release_follow_up(&self, appointment_id: Uuid) -> BookingResult<()> {
    self.set_flag(appointment_id, "follow_up_sent", false).await.map(|_| ())
  }
}
