// core/src/reminders.rs

//! Periodic reminder and follow-up scans.
//!
//! Each entity is claimed with an atomic false -> true flag flip before its
//! message is sent, and released again if the send fails. Overlapping runs
//! therefore never send twice for the same entity, and a failed send is
//! retried by a later run.

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::future::Future;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{ReminderConfig, ReminderWindow};
use crate::domain::{Appointment, Order};
use crate::error::{BookingError, BookingResult};
use crate::notify::{NotificationDispatcher, NotificationEvent, TemplateContext};
use crate::ports::Stores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReminderTarget {
  Appointment(Uuid),
  Order(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderResult {
  Sent,
  /// Another run claimed the entity first.
  AlreadyClaimed,
  /// Not sent; the flag was released so a later run retries.
  Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderOutcome {
  pub target: ReminderTarget,
  pub result: ReminderResult,
}

/// Inclusive UTC bounds of a local calendar day.
fn local_day_bounds(day: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
  let local_midnight = day.and_time(NaiveTime::MIN) - Duration::seconds(i64::from(offset.local_minus_utc()));
  let start = Utc.from_utc_datetime(&local_midnight);
  (start, start + Duration::days(1) - Duration::microseconds(1))
}

pub struct ReminderScheduler {
  stores: Stores,
  notifier: NotificationDispatcher,
  config: ReminderConfig,
}

impl ReminderScheduler {
  pub fn new(stores: Stores, notifier: NotificationDispatcher, config: ReminderConfig) -> Self {
    Self {
      stores,
      notifier,
      config,
    }
  }

  fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&self.config.local_offset).date_naive()
  }

  /// UTC bounds (inclusive) of the reminder window as seen at `now`.
  pub fn window_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    match self.config.window {
      ReminderWindow::Within(ahead) => (now, now + ahead),
      ReminderWindow::DaysAhead(days) => {
        let day = self
          .local_today(now)
          .checked_add_days(Days::new(u64::from(days)))
          .unwrap_or(NaiveDate::MAX);
        local_day_bounds(day, self.config.local_offset)
      }
    }
  }

  /// Local calendar days covered by the window, for date-only orders.
  fn window_days(&self, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let (from, to) = self.window_bounds(now);
    let offset = self.config.local_offset;
    (
      from.with_timezone(&offset).date_naive(),
      to.with_timezone(&offset).date_naive(),
    )
  }

  /// Sends reminders for confirmed appointments and settled orders whose
  /// date falls within the configured window and that were not reminded yet.
  #[instrument(name = "ReminderScheduler::run_due_reminders", skip(self), err(Display))]
  pub async fn run_due_reminders(&self, now: DateTime<Utc>) -> BookingResult<Vec<ReminderOutcome>> {
    let (from, to) = self.window_bounds(now);
    let appointments = self.stores.appointments.due_for_reminder(from, to).await?;

    let (first_day, last_day) = self.window_days(now);
    let orders = self.stores.orders.due_for_reminder(first_day, last_day).await?;

    let mut outcomes = Vec::with_capacity(appointments.len() + orders.len());
    for appointment in &appointments {
      let outcome = self
        .claim_and_send(
          ReminderTarget::Appointment(appointment.id),
          self.stores.appointments.claim_reminder(appointment.id),
          self.send_appointment_message(NotificationEvent::AppointmentReminder, appointment),
          self.stores.appointments.release_reminder(appointment.id),
        )
        .await;
      outcomes.push(outcome);
    }
    for order in &orders {
      let outcome = self
        .claim_and_send(
          ReminderTarget::Order(order.id),
          self.stores.orders.claim_reminder(order.id),
          self.send_order_reminder(order),
          self.stores.orders.release_reminder(order.id),
        )
        .await;
      outcomes.push(outcome);
    }

    log_summary("reminders", &outcomes);
    Ok(outcomes)
  }

  /// Sends follow-ups for appointments completed on the previous local day.
  #[instrument(name = "ReminderScheduler::run_follow_ups", skip(self), err(Display))]
  pub async fn run_follow_ups(&self, now: DateTime<Utc>) -> BookingResult<Vec<ReminderOutcome>> {
    let yesterday = self
      .local_today(now)
      .pred_opt()
      .unwrap_or(NaiveDate::MIN);
    let (from, to) = local_day_bounds(yesterday, self.config.local_offset);
    let appointments = self.stores.appointments.due_for_follow_up(from, to).await?;

    let mut outcomes = Vec::with_capacity(appointments.len());
    for appointment in &appointments {
      let outcome = self
        .claim_and_send(
          ReminderTarget::Appointment(appointment.id),
          self.stores.appointments.claim_follow_up(appointment.id),
          self.send_appointment_message(NotificationEvent::AppointmentFollowup, appointment),
          self.stores.appointments.release_follow_up(appointment.id),
        )
        .await;
      outcomes.push(outcome);
    }

    log_summary("follow-ups", &outcomes);
    Ok(outcomes)
  }

  /// `send` and `release` are only polled when the claim succeeded.
  async fn claim_and_send<C, S, R>(&self, target: ReminderTarget, claim: C, send: S, release: R) -> ReminderOutcome
  where
    C: Future<Output = BookingResult<bool>>,
    S: Future<Output = BookingResult<()>>,
    R: Future<Output = BookingResult<()>>,
  {
    let result = match claim.await {
      Ok(false) => ReminderResult::AlreadyClaimed,
      Err(err) => {
        warn!(?target, error = %err, "Could not claim reminder flag.");
        ReminderResult::Failed(err.to_string())
      }
      Ok(true) => match send.await {
        Ok(()) => ReminderResult::Sent,
        Err(err) => {
          warn!(?target, error = %err, "Reminder send failed; releasing claim for retry.");
          if let Err(release_err) = release.await {
            warn!(?target, error = %release_err, "Could not release reminder claim; it will not be retried.");
          }
          ReminderResult::Failed(err.to_string())
        }
      },
    };
    ReminderOutcome { target, result }
  }

  async fn send_appointment_message(&self, event: NotificationEvent, appointment: &Appointment) -> BookingResult<()> {
    let customer = self
      .stores
      .customers
      .get_customer(appointment.customer_id)
      .await?
      .ok_or_else(|| BookingError::not_found("customer", appointment.customer_id))?;

    let context = TemplateContext::new()
      .customer(customer.name)
      .provider(appointment.hospital_name.clone())
      .at(appointment.date_time);
    self.notifier.notify(event, &customer.phone, &context).await?;
    Ok(())
  }

  async fn send_order_reminder(&self, order: &Order) -> BookingResult<()> {
    let date = order
      .date
      .ok_or_else(|| BookingError::Validation(format!("Order {} has no date to remind about", order.id)))?;
    let customer = self
      .stores
      .customers
      .get_customer(order.customer_id)
      .await?
      .ok_or_else(|| BookingError::not_found("customer", order.customer_id))?;

    let mut context = TemplateContext::new().customer(customer.name).on(date);
    if let Some(service) = self.stores.services.get_service(order.service_id).await? {
      context = context.provider(service.name);
    }
    self
      .notifier
      .notify(NotificationEvent::AppointmentReminder, &customer.phone, &context)
      .await?;
    Ok(())
  }
}

fn log_summary(kind: &str, outcomes: &[ReminderOutcome]) {
  let sent = outcomes.iter().filter(|o| o.result == ReminderResult::Sent).count();
  let failed = outcomes
    .iter()
    .filter(|o| matches!(o.result, ReminderResult::Failed(_)))
    .count();
  info!(kind, due = outcomes.len(), sent, failed, "Reminder run finished.");
}
