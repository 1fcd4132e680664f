// core/src/domain/appointment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{invalid_transition, unknown_status};
use crate::error::{BookingError, BookingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
  Pending,
  Confirmed,
  Rejected,
  Completed,
  Cancelled,
}

impl AppointmentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      AppointmentStatus::Pending => "pending",
      AppointmentStatus::Confirmed => "confirmed",
      AppointmentStatus::Rejected => "rejected",
      AppointmentStatus::Completed => "completed",
      AppointmentStatus::Cancelled => "cancelled",
    }
  }

  pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
      (self, next),
      (Pending, Confirmed)
        | (Pending, Rejected)
        | (Pending, Cancelled)
        | (Confirmed, Completed)
        | (Confirmed, Cancelled)
        | (Confirmed, Rejected)
    )
  }

  pub fn ensure_transition(self, next: AppointmentStatus) -> BookingResult<()> {
    if self.can_transition_to(next) {
      Ok(())
    } else {
      Err(invalid_transition("appointment", self, next))
    }
  }
}

impl fmt::Display for AppointmentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for AppointmentStatus {
  type Err = BookingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(AppointmentStatus::Pending),
      "confirmed" => Ok(AppointmentStatus::Confirmed),
      "rejected" => Ok(AppointmentStatus::Rejected),
      "completed" => Ok(AppointmentStatus::Completed),
      "cancelled" => Ok(AppointmentStatus::Cancelled),
      other => Err(unknown_status("appointment", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub date_time: DateTime<Utc>,
  pub hospital_name: String,
  pub status: AppointmentStatus,
  pub reminder_sent: bool,
  pub follow_up_sent: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
  pub customer_id: Uuid,
  pub date_time: DateTime<Utc>,
  pub hospital_name: String,
}

impl NewAppointment {
  pub fn validate(&self) -> BookingResult<()> {
    let name_len = self.hospital_name.trim().chars().count();
    if !(2..=100).contains(&name_len) {
      return Err(BookingError::Validation(
        "hospitalName must be between 2 and 100 characters".to_string(),
      ));
    }
    Ok(())
  }
}
