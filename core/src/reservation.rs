// core/src/reservation.rs

//! Derives the reservation a paid order produces.

use chrono::Duration;
use tracing::info;

use crate::domain::{Order, ReservationPeriod, ReservationSpec, ReservationStatus, Service, ServiceType};

/// Why an order yields no reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoReservation {
  MissingDate,
  MissingDateCount,
  InvalidDateCount(i32),
}

/// Stateless and deterministic: the same order and service always derive the same spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservationDeriver;

impl ReservationDeriver {
  pub fn new() -> Self {
    Self
  }

  /// - `fixed`: a single confirmed day at `order.date`.
  /// - `perDate`: confirmed inclusive range `order.date ..= order.date + (dateCount - 1) days`.
  ///
  /// Missing or invalid inputs produce `Err(NoReservation)`, which callers log;
  /// it is never a failure of the payment flow.
  pub fn derive(&self, order: &Order, service: &Service) -> Result<ReservationSpec, NoReservation> {
    let date = order.date.ok_or(NoReservation::MissingDate)?;

    let period = match service.service_type {
      ServiceType::Fixed => ReservationPeriod::Single { date },
      ServiceType::PerDate => {
        let count = order.date_count.ok_or(NoReservation::MissingDateCount)?;
        if count < 1 {
          return Err(NoReservation::InvalidDateCount(count));
        }
        let end_date = date
          .checked_add_signed(Duration::days(i64::from(count) - 1))
          .ok_or(NoReservation::InvalidDateCount(count))?;
        ReservationPeriod::Range {
          start_date: date,
          end_date,
        }
      }
    };

    Ok(ReservationSpec {
      order_id: order.id,
      period,
      status: ReservationStatus::Confirmed,
    })
  }

  /// [`derive`](Self::derive), logging the reason when nothing is derived.
  pub fn derive_or_log(&self, order: &Order, service: &Service) -> Option<ReservationSpec> {
    match self.derive(order, service) {
      Ok(spec) => Some(spec),
      Err(reason) => {
        info!(
          order_id = %order.id,
          service_type = service.service_type.as_str(),
          ?reason,
          "Order does not yield a reservation."
        );
        None
      }
    }
  }
}
