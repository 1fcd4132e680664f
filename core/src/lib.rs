// core/src/lib.rs

//! Bookwell: the booking backend core.
//!
//! Payment initiation and reconciliation, reservation derivation, SMS
//! notifications and reminder scans for an appointment/order booking
//! business. Storage and external providers are reached only through the
//! async traits in [`ports`], so every service here can run against the
//! in-memory [`store::MemoryStore`] as well as a real database.
//!
//!  - [`PaymentWorkflow`]: initiate, reconcile webhooks, verify, refresh, resume fulfillment.
//!  - [`ReservationDeriver`]: reservation dates from order and service data.
//!  - [`NotificationDispatcher`]: templated SMS with explicit best-effort sends.
//!  - [`ReminderScheduler`]: idempotent reminder and follow-up runs.
//!  - [`SantimPayAdapter`]: signed requests to the payment provider.

pub mod appointments;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod ports;
pub mod reminders;
pub mod reservation;
pub mod store;
pub mod workflow;

// --- Re-exports for the public API ---

pub use crate::appointments::AppointmentService;
pub use crate::config::{
  offset_from_minutes, DispatchMode, GatewayConfig, NotifierConfig, ReminderConfig, ReminderWindow, WorkflowConfig,
};
pub use crate::error::{BookingError, BookingResult, IgnoreFailure};
pub use crate::gateway::{SantimPayAdapter, WebhookPayload};
pub use crate::notify::{NotificationDispatcher, NotificationEvent, TemplateContext};
pub use crate::ports::Stores;
pub use crate::reminders::{ReminderOutcome, ReminderResult, ReminderScheduler, ReminderTarget};
pub use crate::reservation::{NoReservation, ReservationDeriver};
pub use crate::workflow::{
  Fulfillment, InitiatePayment, InitiatedPayment, PaymentWorkflow, WebhookAck, WebhookOutcome,
};
