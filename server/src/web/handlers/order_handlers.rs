// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use bookwell::domain::NewOrder;
use bookwell::BookingError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::response;

#[instrument(
  name = "handler::create_order",
  skip(app_state, payload),
  fields(customer_id = %payload.customer_id, service_id = %payload.service_id)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
  let new_order = payload.into_inner();
  let stores = &app_state.stores;

  let service = stores
    .services
    .get_service(new_order.service_id)
    .await?
    .ok_or_else(|| BookingError::not_found("service", new_order.service_id))?;
  new_order.validate_for(&service)?;

  stores
    .customers
    .get_customer(new_order.customer_id)
    .await?
    .ok_or_else(|| BookingError::not_found("customer", new_order.customer_id))?;

  let order = stores.orders.insert(new_order).await?;
  info!(order_id = %order.id, "Order created.");
  Ok(response::created("Order created successfully.", order))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .stores
    .orders
    .get(order_id)
    .await?
    .ok_or_else(|| BookingError::not_found("order", order_id))?;
  Ok(response::ok(order))
}

#[instrument(name = "handler::get_order_reservation", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_reservation_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let reservation = app_state
    .stores
    .reservations
    .find_by_order(order_id)
    .await?
    .ok_or_else(|| BookingError::not_found("reservation", order_id))?;
  Ok(response::ok(reservation))
}
