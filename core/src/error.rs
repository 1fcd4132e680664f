// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid phone number '{phone}': {reason}")]
    PhoneFormat { phone: String, reason: String },

    #[error("Invalid {entity} status transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payment initiation failed for reference '{reference}': {reason}")]
    PaymentInitiationFailed { reference: String, reason: String },

    #[error("External service '{service}' failed: {message}")]
    ExternalService { service: &'static str, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error. Source: {source}")]
    Storage {
        #[source]
        source: AnyhowError,
    },
}

impl BookingError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        BookingError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Wraps any backend failure (database driver, pool, serialization) as a storage error.
    pub fn storage(err: impl Into<AnyhowError>) -> Self {
        BookingError::Storage { source: err.into() }
    }

    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        BookingError::ExternalService {
            service,
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, BookingError::Conflict(_))
    }
}

impl From<AnyhowError> for BookingError {
    fn from(err: AnyhowError) -> Self {
        // Keep an already-typed error intact when it round-tripped through anyhow.
        match err.downcast::<BookingError>() {
            Ok(booking_err) => booking_err,
            Err(other) => BookingError::Storage { source: other },
        }
    }
}

pub type BookingResult<T, E = BookingError> = std::result::Result<T, E>;

/// Explicitly discards the failure of a best-effort side effect after logging it.
///
/// Notification sends never decide the outcome of the operation that triggered
/// them, but the discard has to be visible at the call site.
pub trait IgnoreFailure {
    fn ignore_failure(self, purpose: &str);
}

impl<T> IgnoreFailure for BookingResult<T> {
    fn ignore_failure(self, purpose: &str) {
        if let Err(err) = self {
            tracing::warn!(purpose, error = %err, "Best-effort side effect failed; continuing.");
        }
    }
}
