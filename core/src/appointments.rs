// core/src/appointments.rs

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Appointment, AppointmentStatus, NewAppointment};
use crate::error::{BookingError, BookingResult};
use crate::notify::{NotificationDispatcher, NotificationEvent, TemplateContext};
use crate::ports::Stores;

/// Which message a status change sends, if any. Re-confirming an already
/// confirmed appointment stays silent.
fn event_for(previous: AppointmentStatus, next: AppointmentStatus) -> Option<NotificationEvent> {
  match next {
    AppointmentStatus::Confirmed if previous != AppointmentStatus::Confirmed => {
      Some(NotificationEvent::AppointmentConfirmed)
    }
    AppointmentStatus::Rejected => Some(NotificationEvent::AppointmentRejected),
    AppointmentStatus::Completed => Some(NotificationEvent::AppointmentCompleted),
    AppointmentStatus::Cancelled => Some(NotificationEvent::AppointmentCancelled),
    _ => None,
  }
}

/// Appointment creation and admin status changes, each followed by a
/// best-effort SMS to the customer.
#[derive(Clone)]
pub struct AppointmentService {
  stores: Stores,
  notifier: NotificationDispatcher,
}

impl AppointmentService {
  pub fn new(stores: Stores, notifier: NotificationDispatcher) -> Self {
    Self { stores, notifier }
  }

  #[instrument(
    name = "AppointmentService::create",
    skip(self, appointment),
    fields(customer_id = %appointment.customer_id),
    err(Display)
  )]
  pub async fn create(&self, appointment: NewAppointment) -> BookingResult<Appointment> {
    appointment.validate()?;
    if self
      .stores
      .customers
      .get_customer(appointment.customer_id)
      .await?
      .is_none()
    {
      return Err(BookingError::not_found("customer", appointment.customer_id));
    }

    let created = self.stores.appointments.insert(appointment).await?;
    info!(appointment_id = %created.id, "Appointment created.");
    self.notify(NotificationEvent::AppointmentCreated, &created).await;
    Ok(created)
  }

  pub async fn get(&self, appointment_id: Uuid) -> BookingResult<Appointment> {
    self
      .stores
      .appointments
      .get(appointment_id)
      .await?
      .ok_or_else(|| BookingError::not_found("appointment", appointment_id))
  }

  /// Validates and applies a status change. Setting the current status again
  /// is a no-op; a concurrent change between read and write is a `Conflict`.
  #[instrument(name = "AppointmentService::update_status", skip(self), err(Display))]
  pub async fn update_status(&self, appointment_id: Uuid, next: AppointmentStatus) -> BookingResult<Appointment> {
    let current = self.get(appointment_id).await?;
    if current.status == next {
      return Ok(current);
    }
    current.status.ensure_transition(next)?;

    let updated = self
      .stores
      .appointments
      .update_status(appointment_id, current.status, next)
      .await?
      .ok_or_else(|| {
        BookingError::Conflict(format!(
          "Appointment {} changed status concurrently; expected '{}'",
          appointment_id, current.status
        ))
      })?;
    info!(from = %current.status, to = %next, "Appointment status updated.");

    if let Some(event) = event_for(current.status, next) {
      self.notify(event, &updated).await;
    }
    Ok(updated)
  }

  async fn notify(&self, event: NotificationEvent, appointment: &Appointment) {
    let customer = match self.stores.customers.get_customer(appointment.customer_id).await {
      Ok(Some(customer)) => customer,
      Ok(None) => {
        warn!(customer_id = %appointment.customer_id, event = event.as_str(), "Customer not found; SMS skipped.");
        return;
      }
      Err(err) => {
        warn!(error = %err, event = event.as_str(), "Customer lookup failed; SMS skipped.");
        return;
      }
    };

    let context = TemplateContext::new()
      .customer(customer.name)
      .provider(appointment.hospital_name.clone())
      .at(appointment.date_time);
    self.notifier.notify_best_effort(event, customer.phone, context).await;
  }
}

