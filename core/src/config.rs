// core/src/config.rs

//! Plain configuration structs handed to the core services at construction.
//! Loading them (env, files) is the application's concern.

use chrono::{Duration, FixedOffset, Offset, Utc};

/// Builds a fixed offset from minutes east of UTC, falling back to UTC when out of range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
  FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// How best-effort notifications are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
  /// Await the send in the caller's task. The result is still only logged.
  Inline,
  /// Spawn the send on the tokio runtime; the caller never waits for it.
  Detached,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
  /// Country calling code used to normalize local numbers, e.g. "251".
  pub country_code: String,
  /// Offset used when rendering dates and times in messages.
  pub display_offset: FixedOffset,
  pub mode: DispatchMode,
}

impl Default for NotifierConfig {
  fn default() -> Self {
    Self {
      country_code: "251".to_string(),
      display_offset: offset_from_minutes(180),
      mode: DispatchMode::Detached,
    }
  }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
  pub merchant_id: String,
  pub country_code: String,
}

/// Callback URLs embedded in every checkout. `{reference}` is substituted.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
  pub success_url: String,
  pub failure_url: String,
  pub notify_url: String,
  pub payment_option: String,
}

impl WorkflowConfig {
  pub fn from_base_urls(frontend_url: &str, backend_url: &str, payment_option: &str) -> Self {
    let frontend = frontend_url.trim_end_matches('/');
    let backend = backend_url.trim_end_matches('/');
    Self {
      success_url: format!("{}/payment/success?reference={{reference}}", frontend),
      failure_url: format!("{}/payment/failed?reference={{reference}}", frontend),
      notify_url: format!("{}/api/v1/webhooks/{}", backend, payment_option),
      payment_option: payment_option.to_string(),
    }
  }
}

/// Which scheduled dates a reminder run considers due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderWindow {
  /// Everything in `[now, now + duration]`, both ends inclusive.
  Within(Duration),
  /// The whole local calendar day `n` days after today.
  DaysAhead(u32),
}

#[derive(Debug, Clone)]
pub struct ReminderConfig {
  pub window: ReminderWindow,
  /// Offset that defines "calendar day" for day-based windows and follow-ups.
  pub local_offset: FixedOffset,
}

impl Default for ReminderConfig {
  fn default() -> Self {
    Self {
      window: ReminderWindow::Within(Duration::hours(24)),
      local_offset: NotifierConfig::default().display_offset,
    }
  }
}
