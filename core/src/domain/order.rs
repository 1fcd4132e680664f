// core/src/domain/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::catalog::{Service, ServiceType};
use super::{invalid_transition, unknown_status};
use crate::error::{BookingError, BookingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  InProgress,
  Completed,
  Cancelled,
  Paid,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::InProgress => "in_progress",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
      OrderStatus::Paid => "paid",
    }
  }

  /// `pending -> paid` is reserved for payment fulfillment; everything after
  /// that is an administrative progression.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Paid)
        | (Pending, Cancelled)
        | (Paid, Confirmed)
        | (Paid, InProgress)
        | (Paid, Cancelled)
        | (Confirmed, InProgress)
        | (Confirmed, Cancelled)
        | (InProgress, Completed)
        | (InProgress, Cancelled)
    )
  }

  pub fn ensure_transition(self, next: OrderStatus) -> BookingResult<()> {
    if self.can_transition_to(next) {
      Ok(())
    } else {
      Err(invalid_transition("order", self, next))
    }
  }

  /// Whether the order has been paid for, regardless of later progression.
  pub fn is_settled(self) -> bool {
    matches!(
      self,
      OrderStatus::Paid | OrderStatus::Confirmed | OrderStatus::InProgress | OrderStatus::Completed
    )
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = BookingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "confirmed" => Ok(OrderStatus::Confirmed),
      "in_progress" => Ok(OrderStatus::InProgress),
      "completed" => Ok(OrderStatus::Completed),
      "cancelled" => Ok(OrderStatus::Cancelled),
      "paid" => Ok(OrderStatus::Paid),
      other => Err(unknown_status("order", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub service_id: Uuid,
  pub package_id: Option<Uuid>,
  pub description: Option<String>,
  pub attached_file_path: Option<String>,
  pub date: Option<NaiveDate>,
  pub date_count: Option<i32>,
  pub status: OrderStatus,
  pub reminder_sent: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  pub customer_id: Uuid,
  pub service_id: Uuid,
  pub package_id: Option<Uuid>,
  pub description: Option<String>,
  pub attached_file_path: Option<String>,
  pub date: Option<NaiveDate>,
  pub date_count: Option<i32>,
}

impl NewOrder {
  /// Checks the order against the service it books. A per-date service needs
  /// a start date and a positive day count; a fixed service needs a date.
  pub fn validate_for(&self, service: &Service) -> BookingResult<()> {
    if let Some(count) = self.date_count {
      if count < 1 {
        return Err(BookingError::Validation("dateCount must be at least 1".to_string()));
      }
    }
    match service.service_type {
      ServiceType::PerDate if self.date.is_none() || self.date_count.is_none() => Err(BookingError::Validation(
        format!("Service '{}' is booked per date and needs date and dateCount", service.name),
      )),
      ServiceType::Fixed if self.date.is_none() => Err(BookingError::Validation(format!(
        "Service '{}' needs a date",
        service.name
      ))),
      _ => Ok(()),
    }
  }
}
