// core/src/ports.rs

//! Boundaries between the booking core and the outside world.
//!
//! Storage ports are expressed so that every state change the workflow relies
//! on for idempotency is a single conditional write (`settle_if_pending`,
//! `claim_reminder`, `insert` keyed by order). Implementations must keep those
//! writes atomic; the core holds no locks of its own across them.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
  Appointment, AppointmentStatus, Customer, NewAppointment, NewOrder, NewPayment, Order, Payment,
  Reservation, ReservationSpec, Service, Settlement,
};
use crate::error::BookingResult;

// --- Storage ports ---

#[async_trait]
pub trait PaymentStore: Send + Sync {
  /// Persists a new pending payment. A duplicate reference is a `Conflict`.
  async fn insert_pending(&self, payment: NewPayment) -> BookingResult<Payment>;

  /// Merges the checkout session into the metadata of a still-pending payment.
  async fn attach_checkout(&self, payment_id: Uuid, checkout: &CheckoutSession) -> BookingResult<Payment>;

  /// Removes a payment that never left `pending`. Used to compensate a failed
  /// gateway call; a no-op when the row is gone or already settled.
  async fn discard_pending(&self, payment_id: Uuid) -> BookingResult<()>;

  async fn find_by_reference(&self, reference: &str) -> BookingResult<Option<Payment>>;

  /// Atomically applies `settlement` if and only if the payment is still
  /// pending. Returns the updated row, or `None` when nothing was changed
  /// (unknown reference or already terminal).
  async fn settle_if_pending(&self, reference: &str, settlement: &Settlement) -> BookingResult<Option<Payment>>;

  /// Completed payments whose fulfillment looks unfinished: the order is
  /// still pending, or it carries a date but has no reservation. Oldest first.
  async fn completed_without_reservation(&self, limit: usize) -> BookingResult<Vec<Payment>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert(&self, order: NewOrder) -> BookingResult<Order>;

  async fn get(&self, order_id: Uuid) -> BookingResult<Option<Order>>;

  /// Moves a pending order to `paid`. Returns `false` when the order was
  /// already settled, so repeated fulfillment is harmless.
  async fn mark_paid(&self, order_id: Uuid) -> BookingResult<bool>;

  /// Settled orders dated within `[from, to]` whose reminder flag is still clear.
  async fn due_for_reminder(&self, from: NaiveDate, to: NaiveDate) -> BookingResult<Vec<Order>>;

  /// Flips `reminder_sent` from false to true. `false` means another run got there first.
  async fn claim_reminder(&self, order_id: Uuid) -> BookingResult<bool>;

  async fn release_reminder(&self, order_id: Uuid) -> BookingResult<()>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
  /// Creates the reservation for `spec.order_id`. A reservation already
  /// existing for that order is a `Conflict`.
  async fn insert(&self, spec: &ReservationSpec) -> BookingResult<Reservation>;

  async fn find_by_order(&self, order_id: Uuid) -> BookingResult<Option<Reservation>>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
  async fn insert(&self, appointment: NewAppointment) -> BookingResult<Appointment>;

  async fn get(&self, appointment_id: Uuid) -> BookingResult<Option<Appointment>>;

  /// Conditional status change; `None` when the stored status is no longer `expected`.
  async fn update_status(
    &self,
    appointment_id: Uuid,
    expected: AppointmentStatus,
    next: AppointmentStatus,
  ) -> BookingResult<Option<Appointment>>;

  /// Confirmed appointments in `[from, to]` with `reminder_sent == false`.
  async fn due_for_reminder(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Vec<Appointment>>;

  /// Completed appointments in `[from, to]` with `follow_up_sent == false`.
  async fn due_for_follow_up(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Vec<Appointment>>;

  async fn claim_reminder(&self, appointment_id: Uuid) -> BookingResult<bool>;

  async fn release_reminder(&self, appointment_id: Uuid) -> BookingResult<()>;

  async fn claim_follow_up(&self, appointment_id: Uuid) -> BookingResult<bool>;

  async fn release_follow_up(&self, appointment_id: Uuid) -> BookingResult<()>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
  async fn get_service(&self, service_id: Uuid) -> BookingResult<Option<Service>>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
  async fn get_customer(&self, customer_id: Uuid) -> BookingResult<Option<Customer>>;
}

/// All storage ports the services need, cheap to clone.
#[derive(Clone)]
pub struct Stores {
  pub payments: Arc<dyn PaymentStore>,
  pub orders: Arc<dyn OrderStore>,
  pub reservations: Arc<dyn ReservationStore>,
  pub appointments: Arc<dyn AppointmentStore>,
  pub services: Arc<dyn ServiceCatalog>,
  pub customers: Arc<dyn CustomerDirectory>,
}

// --- Provider ports ---

/// Everything the gateway needs to open a hosted checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
  pub reference: String,
  pub order_id: Uuid,
  pub amount: Decimal,
  /// Normalized international form (`<cc>9xxxxxxxx`), without a leading `+`.
  pub payer_phone: Option<String>,
  pub description: Option<String>,
  pub success_url: String,
  pub failure_url: String,
  pub notify_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
  pub redirect_url: String,
  pub provider_reference: Option<String>,
}

/// Provider-side view of a transaction, as returned by verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
  Completed,
  Pending,
  Failed,
}

#[derive(Debug, Clone)]
pub struct ProviderVerification {
  pub status: ProviderStatus,
  pub provider_transaction_id: Option<String>,
  pub amount: Option<Decimal>,
  pub raw: JsonValue,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn initiate_external_payment(&self, request: &CheckoutRequest) -> BookingResult<CheckoutSession>;

  async fn verify_external_payment(&self, reference: &str) -> BookingResult<ProviderVerification>;
}

/// Raw JSON transport to the gateway's HTTP API. Paths are relative to the
/// configured base URL. Non-success responses must surface as errors.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
  async fn post_json(&self, path: &str, body: &JsonValue) -> BookingResult<JsonValue>;

  async fn get_json(&self, path: &str, bearer_token: &str) -> BookingResult<JsonValue>;
}

/// Produces the signed token the gateway requires. Missing or unusable key
/// material is a `Configuration` error.
pub trait TokenSigner: Send + Sync {
  fn sign(&self, claims: &JsonValue) -> BookingResult<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReceipt {
  pub provider_message_id: Option<String>,
}

#[async_trait]
pub trait SmsSender: Send + Sync {
  /// `phone` is already normalized to international form.
  async fn send_sms(&self, phone: &str, message: &str) -> BookingResult<SmsReceipt>;
}
