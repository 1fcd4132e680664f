// core/src/notify/mod.rs

//! SMS notifications: phone normalization, message templates and the
//! dispatcher that sends them through an [`SmsSender`](crate::ports::SmsSender).
//!
//! Sends are best-effort everywhere in the system. A failed send is returned
//! as an error to the immediate caller, which logs and discards it explicitly
//! (see [`IgnoreFailure`](crate::error::IgnoreFailure)); it never rolls back or
//! fails the business operation that triggered it.

pub mod dispatcher;
pub mod phone;
pub mod templates;

pub use dispatcher::NotificationDispatcher;
pub use phone::{mask_phone, normalize_phone};
pub use templates::{render, NotificationEvent, Schedule, TemplateContext};
