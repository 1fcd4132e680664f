// core/src/domain/mod.rs

//! Entities of the booking backend and the closed status enumerations that
//! govern how each of them may change.
//!
//! Every status enum exposes `can_transition_to`, which is the single source of
//! truth for allowed transitions; stores and services validate against it at
//! their boundary instead of comparing raw strings.

pub mod appointment;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod reservation;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use catalog::{Customer, Service, ServiceType};
pub use order::{NewOrder, Order, OrderStatus};
pub use payment::{merge_metadata, NewPayment, Payment, PaymentStatus, PaymentSummary, Settlement};
pub use reservation::{Reservation, ReservationPeriod, ReservationSpec, ReservationStatus};

use crate::error::BookingError;

pub(crate) fn unknown_status(entity: &'static str, raw: &str) -> BookingError {
  BookingError::Validation(format!("Unknown {} status '{}'", entity, raw))
}

pub(crate) fn invalid_transition(entity: &'static str, from: impl ToString, to: impl ToString) -> BookingError {
  BookingError::InvalidTransition {
    entity,
    from: from.to_string(),
    to: to.to_string(),
  }
}
