// server/src/models/mod.rs

//! Database row types. Statuses are stored as text and parsed into the
//! core's closed enums on the way out; an unknown value is a storage error.

pub mod appointment;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod reservation;

pub use appointment::AppointmentRow;
pub use catalog::{CustomerRow, ServiceRow};
pub use order::OrderRow;
pub use payment::PaymentRow;
pub use reservation::ReservationRow;

use bookwell::BookingError;
use std::str::FromStr;

pub(crate) fn parse_column<T>(raw: &str) -> Result<T, BookingError>
where
  T: FromStr<Err = BookingError>,
{
  raw.parse::<T>().map_err(BookingError::storage)
}
