// server/src/web/handlers/appointment_handlers.rs

use actix_web::{web, HttpResponse};
use bookwell::domain::{AppointmentStatus, NewAppointment};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::response;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
  pub status: AppointmentStatus,
}

#[instrument(
  name = "handler::create_appointment",
  skip(app_state, payload),
  fields(customer_id = %payload.customer_id)
)]
pub async fn create_appointment_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewAppointment>,
) -> Result<HttpResponse, AppError> {
  let appointment = app_state.appointments.create(payload.into_inner()).await?;
  Ok(response::created("Appointment created successfully.", appointment))
}

#[instrument(name = "handler::get_appointment", skip(app_state, path), fields(appointment_id = %path.as_ref()))]
pub async fn get_appointment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let appointment = app_state.appointments.get(path.into_inner()).await?;
  Ok(response::ok(appointment))
}

#[instrument(
  name = "handler::update_appointment_status",
  skip(app_state, path, payload),
  fields(appointment_id = %path.as_ref(), status = payload.status.as_str())
)]
pub async fn update_appointment_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
  let appointment = app_state
    .appointments
    .update_status(path.into_inner(), payload.status)
    .await?;
  Ok(response::ok_with("Appointment status updated.", appointment))
}
