// core/src/notify/templates.rs

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, BookingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
  AppointmentCreated,
  AppointmentConfirmed,
  AppointmentRejected,
  AppointmentCompleted,
  AppointmentCancelled,
  AppointmentReminder,
  AppointmentFollowup,
  PaymentLink,
  PaymentConfirmed,
}

impl NotificationEvent {
  pub fn as_str(self) -> &'static str {
    match self {
      NotificationEvent::AppointmentCreated => "appointment_created",
      NotificationEvent::AppointmentConfirmed => "appointment_confirmed",
      NotificationEvent::AppointmentRejected => "appointment_rejected",
      NotificationEvent::AppointmentCompleted => "appointment_completed",
      NotificationEvent::AppointmentCancelled => "appointment_cancelled",
      NotificationEvent::AppointmentReminder => "appointment_reminder",
      NotificationEvent::AppointmentFollowup => "appointment_followup",
      NotificationEvent::PaymentLink => "payment_link",
      NotificationEvent::PaymentConfirmed => "payment_confirmed",
    }
  }
}

/// When the thing being notified about happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
  At(DateTime<Utc>),
  On(NaiveDate),
}

/// Values interpolated into message templates. Each template names the fields it requires.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
  pub customer_name: Option<String>,
  pub provider_name: Option<String>,
  pub schedule: Option<Schedule>,
  pub url: Option<String>,
  pub amount: Option<Decimal>,
  pub reference: Option<String>,
}

impl TemplateContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn customer(mut self, name: impl Into<String>) -> Self {
    self.customer_name = Some(name.into());
    self
  }

  pub fn provider(mut self, name: impl Into<String>) -> Self {
    self.provider_name = Some(name.into());
    self
  }

  pub fn at(mut self, when: DateTime<Utc>) -> Self {
    self.schedule = Some(Schedule::At(when));
    self
  }

  pub fn on(mut self, day: NaiveDate) -> Self {
    self.schedule = Some(Schedule::On(day));
    self
  }

  pub fn url(mut self, url: impl Into<String>) -> Self {
    self.url = Some(url.into());
    self
  }

  pub fn amount(mut self, amount: Decimal) -> Self {
    self.amount = Some(amount);
    self
  }

  pub fn reference(mut self, reference: impl Into<String>) -> Self {
    self.reference = Some(reference.into());
    self
  }
}

fn missing(event: NotificationEvent, field: &str) -> BookingError {
  BookingError::Validation(format!("Template '{}' requires '{}'", event.as_str(), field))
}

fn ordinal_suffix(day: u32) -> &'static str {
  match (day % 10, day % 100) {
    (_, 11..=13) => "th",
    (1, _) => "st",
    (2, _) => "nd",
    (3, _) => "rd",
    _ => "th",
  }
}

/// Renders `June 1st 2024, 9:30 am` (date-times, in `offset`) or `June 1st 2024` (dates).
pub fn format_schedule(schedule: Schedule, offset: FixedOffset) -> String {
  match schedule {
    Schedule::At(when) => {
      let local = when.with_timezone(&offset);
      format!(
        "{} {}{} {}",
        local.format("%B"),
        local.day(),
        ordinal_suffix(local.day()),
        local.format("%Y, %-I:%M %P")
      )
    }
    Schedule::On(day) => format!(
      "{} {}{} {}",
      day.format("%B"),
      day.day(),
      ordinal_suffix(day.day()),
      day.format("%Y")
    ),
  }
}

/// Produces the SMS body for `event`.
pub fn render(event: NotificationEvent, ctx: &TemplateContext, offset: FixedOffset) -> BookingResult<String> {
  let greeting = ctx
    .customer_name
    .as_deref()
    .map(|name| format!("Hi {}, ", name))
    .unwrap_or_default();
  let at_provider = ctx
    .provider_name
    .as_deref()
    .map(|name| format!(" at {}", name))
    .unwrap_or_default();
  let when = || {
    ctx
      .schedule
      .map(|s| format_schedule(s, offset))
      .ok_or_else(|| missing(event, "schedule"))
  };

  let message = match event {
    NotificationEvent::AppointmentCreated => format!(
      "{}we received your appointment request{} for {}. We will confirm it shortly.",
      greeting,
      at_provider,
      when()?
    ),
    NotificationEvent::AppointmentConfirmed => format!(
      "{}your appointment{} is confirmed for {}. Thank you for choosing us!",
      greeting,
      at_provider,
      when()?
    ),
    NotificationEvent::AppointmentRejected => format!(
      "We're sorry, but your appointment{} on {} has been rejected. Please contact us for more information.",
      at_provider,
      when()?
    ),
    NotificationEvent::AppointmentCompleted => format!(
      "{}your appointment{} on {} is complete. Thank you for visiting!",
      greeting,
      at_provider,
      when()?
    ),
    NotificationEvent::AppointmentCancelled => format!(
      "Your appointment{} on {} has been cancelled. Please contact us to reschedule.",
      at_provider,
      when()?
    ),
    NotificationEvent::AppointmentReminder => format!(
      "Reminder: Your appointment{} is scheduled for {}. We look forward to seeing you!",
      at_provider,
      when()?
    ),
    NotificationEvent::AppointmentFollowup => {
      "Thank you for your appointment! We hope to see you again soon.".to_string()
    }
    NotificationEvent::PaymentLink => {
      let url = ctx.url.as_deref().ok_or_else(|| missing(event, "url"))?;
      let amount = ctx.amount.map(|a| format!(" of {}", a)).unwrap_or_default();
      format!("{}please complete your payment{} using this link: {}", greeting, amount, url)
    }
    NotificationEvent::PaymentConfirmed => {
      let amount = ctx.amount.ok_or_else(|| missing(event, "amount"))?;
      let reference = ctx.reference.as_deref().ok_or_else(|| missing(event, "reference"))?;
      format!(
        "Payment of {} has been received successfully. Reference: {}. Thank you!",
        amount, reference
      )
    }
  };

  // Greeting-led templates start lowercase after "Hi name, "; capitalize when there is no greeting.
  Ok(capitalize_first(message))
}

fn capitalize_first(message: String) -> String {
  let mut chars = message.chars();
  match chars.next() {
    Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
    _ => message,
  }
}
