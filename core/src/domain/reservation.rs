// core/src/domain/reservation.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{invalid_transition, unknown_status};
use crate::error::{BookingError, BookingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
  Pending,
  Confirmed,
  Active,
  Completed,
  Cancelled,
}

impl ReservationStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      ReservationStatus::Pending => "pending",
      ReservationStatus::Confirmed => "confirmed",
      ReservationStatus::Active => "active",
      ReservationStatus::Completed => "completed",
      ReservationStatus::Cancelled => "cancelled",
    }
  }

  pub fn can_transition_to(self, next: ReservationStatus) -> bool {
    use ReservationStatus::*;
    matches!(
      (self, next),
      (Pending, Confirmed)
        | (Pending, Cancelled)
        | (Confirmed, Active)
        | (Confirmed, Cancelled)
        | (Active, Completed)
        | (Active, Cancelled)
    )
  }

  pub fn ensure_transition(self, next: ReservationStatus) -> BookingResult<()> {
    if self.can_transition_to(next) {
      Ok(())
    } else {
      Err(invalid_transition("reservation", self, next))
    }
  }
}

impl fmt::Display for ReservationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ReservationStatus {
  type Err = BookingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(ReservationStatus::Pending),
      "confirmed" => Ok(ReservationStatus::Confirmed),
      "active" => Ok(ReservationStatus::Active),
      "completed" => Ok(ReservationStatus::Completed),
      "cancelled" => Ok(ReservationStatus::Cancelled),
      other => Err(unknown_status("reservation", other)),
    }
  }
}

/// The dates a reservation blocks: one day for fixed services, an inclusive
/// range for per-date services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReservationPeriod {
  Single {
    date: NaiveDate,
  },
  #[serde(rename_all = "camelCase")]
  Range {
    start_date: NaiveDate,
    end_date: NaiveDate,
  },
}

impl ReservationPeriod {
  pub fn start(&self) -> NaiveDate {
    match *self {
      ReservationPeriod::Single { date } => date,
      ReservationPeriod::Range { start_date, .. } => start_date,
    }
  }

  pub fn end(&self) -> NaiveDate {
    match *self {
      ReservationPeriod::Single { date } => date,
      ReservationPeriod::Range { end_date, .. } => end_date,
    }
  }
}

/// What fulfillment asks the store to create. Reservations are keyed by order:
/// at most one per order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationSpec {
  pub order_id: Uuid,
  pub period: ReservationPeriod,
  pub status: ReservationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
  pub id: Uuid,
  pub order_id: Uuid,
  pub period: ReservationPeriod,
  pub status: ReservationStatus,
  pub created_at: DateTime<Utc>,
}
