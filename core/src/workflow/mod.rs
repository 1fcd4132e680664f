// core/src/workflow/mod.rs

//! Payment workflow: initiation against the gateway, webhook and
//! verification reconciliation, and fulfillment (order paid + reservation).
//!
//! The payment row is the serialization point. Initiation reserves it as
//! `pending` before the gateway is called and compensates if the call fails;
//! reconciliation moves it out of `pending` with a single conditional write,
//! so concurrent or repeated deliveries apply fulfillment once.

pub mod fulfillment;
pub mod payment;
pub mod reference;

pub use fulfillment::Fulfillment;
pub use payment::{InitiatePayment, InitiatedPayment, PaymentWorkflow, WebhookAck, WebhookOutcome};
pub use reference::generate_reference;
