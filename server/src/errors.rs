// server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use bookwell::BookingError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  /// The payment gateway or SMS provider failed or rejected the request.
  #[error("Upstream Service Error: {0}")]
  Upstream(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<BookingError> for AppError {
  fn from(err: BookingError) -> Self {
    match err {
      BookingError::Validation(_) | BookingError::PhoneFormat { .. } => AppError::Validation(err.to_string()),
      BookingError::NotFound { .. } => AppError::NotFound(err.to_string()),
      BookingError::Conflict(_) | BookingError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
      BookingError::PaymentInitiationFailed { .. } | BookingError::ExternalService { .. } => {
        AppError::Upstream(err.to_string())
      }
      BookingError::Configuration(message) => AppError::Config(message),
      BookingError::Storage { source } => AppError::Internal(format!("Storage failure: {:#}", source)),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<BookingError>() {
      Ok(booking_err) => booking_err.into(),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let body = |message: &str| json!({ "success": false, "message": message });
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(body(m)),
      AppError::NotFound(m) => HttpResponse::NotFound().json(body(m)),
      AppError::Conflict(m) => HttpResponse::Conflict().json(body(m)),
      AppError::Upstream(m) => HttpResponse::BadGateway().json(body(m)),
      AppError::Config(_) => HttpResponse::InternalServerError().json(body("Configuration issue")),
      AppError::Sqlx(_) | AppError::Migration(_) => {
        HttpResponse::InternalServerError().json(body("Database operation failed"))
      }
      AppError::Internal(_) => HttpResponse::InternalServerError().json(body("An internal error occurred")),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
