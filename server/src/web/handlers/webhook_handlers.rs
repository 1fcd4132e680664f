// server/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

/// Payment provider callback.
///
/// Every body that reaches reconciliation is answered with 200 so the
/// provider stops retrying; internal failures are only visible in the logs
/// and in `handled: false`.
#[instrument(
  name = "handler::payment_webhook",
  skip(app_state, provider, body),
  fields(provider = %provider.as_ref(), body_len = body.len())
)]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  provider: web::Path<String>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let provider = provider.into_inner();
  if provider != app_state.payment_option {
    warn!("Webhook for unconfigured provider.");
    return Err(AppError::NotFound(format!("No webhook endpoint for provider '{}'", provider)));
  }

  let ack = app_state.workflow.reconcile_webhook_body(&body).await;
  info!(handled = ack.handled, payment_id = ?ack.payment_id, "Webhook acknowledged.");
  Ok(HttpResponse::Ok().json(ack))
}
