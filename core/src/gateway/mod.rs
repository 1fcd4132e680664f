// core/src/gateway/mod.rs

//! Payment provider integration: the SantimPay adapter (request building,
//! signing through a [`TokenSigner`](crate::ports::TokenSigner), response
//! parsing) and the webhook payload it posts back.

pub mod santimpay;
pub mod webhook;

pub use santimpay::SantimPayAdapter;
pub use webhook::WebhookPayload;
