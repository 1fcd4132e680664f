// server/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use bookwell::InitiatePayment;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::response;

#[instrument(
  name = "handler::initiate_payment",
  skip(app_state, payload),
  fields(order_id = %payload.order_id)
)]
pub async fn initiate_payment_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<InitiatePayment>,
) -> Result<HttpResponse, AppError> {
  let initiated = app_state.workflow.initiate(payload.into_inner()).await?;
  Ok(response::ok_with("Payment initiated successfully.", initiated))
}

#[instrument(name = "handler::verify_payment", skip(app_state, path), fields(reference = %path.as_ref()))]
pub async fn verify_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let summary = app_state.workflow.verify(&path.into_inner()).await?;
  Ok(response::ok(summary))
}

/// Asks the provider for the current status and settles the payment if it moved.
#[instrument(name = "handler::refresh_payment", skip(app_state, path), fields(reference = %path.as_ref()))]
pub async fn refresh_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let summary = app_state.workflow.refresh_from_provider(&path.into_inner()).await?;
  Ok(response::ok(summary))
}
