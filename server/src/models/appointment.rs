// server/src/models/appointment.rs

use bookwell::domain::Appointment;
use bookwell::BookingError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRow {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub date_time: DateTime<Utc>,
  pub hospital_name: String,
  pub status: String,
  pub reminder_sent: bool,
  pub follow_up_sent: bool,
  pub created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
  type Error = BookingError;

  fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
    Ok(Appointment {
      id: row.id,
      customer_id: row.customer_id,
      date_time: row.date_time,
      hospital_name: row.hospital_name,
      status: parse_column(&row.status)?,
      reminder_sent: row.reminder_sent,
      follow_up_sent: row.follow_up_sent,
      created_at: row.created_at,
    })
  }
}
