// server/src/models/reservation.rs

use bookwell::domain::{Reservation, ReservationPeriod};
use bookwell::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

/// Fixed-service reservations are stored with `kind = 'single'` and equal dates.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub kind: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

pub fn period_kind(period: &ReservationPeriod) -> &'static str {
  match period {
    ReservationPeriod::Single { .. } => "single",
    ReservationPeriod::Range { .. } => "range",
  }
}

impl TryFrom<ReservationRow> for Reservation {
  type Error = BookingError;

  fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
    let period = match row.kind.as_str() {
      "single" => ReservationPeriod::Single { date: row.start_date },
      "range" => ReservationPeriod::Range {
        start_date: row.start_date,
        end_date: row.end_date,
      },
      other => {
        return Err(BookingError::storage(anyhow::anyhow!(
          "unknown reservation kind '{}'",
          other
        )))
      }
    };
    Ok(Reservation {
      id: row.id,
      order_id: row.order_id,
      period,
      status: parse_column(&row.status)?,
      created_at: row.created_at,
    })
  }
}
