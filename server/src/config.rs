// server/src/config.rs

use bookwell::{
  offset_from_minutes, DispatchMode, GatewayConfig, NotifierConfig, ReminderConfig, ReminderWindow, WorkflowConfig,
};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  pub frontend_url: String,
  pub backend_url: String,

  // SantimPay
  pub santimpay_base_url: String,
  pub merchant_id: String,
  pub private_key_pem: String,
  pub payment_option: String,

  // GeezSMS
  pub sms_base_url: String,
  pub sms_token: String,
  pub sms_shortcode_id: Option<String>,
  pub sms_callback_url: Option<String>,
  pub sms_country_code: String,

  pub display_offset_minutes: i32,
  pub http_timeout: Duration,

  pub appointment_reminder_hours: i64,
  pub reminder_interval: Duration,
  pub appointment_reminder_days_ahead: u32,
  pub day_ahead_reminder_interval: Duration,
  pub follow_up_interval: Duration,
  pub fulfillment_sweep_interval: Duration,

  pub log_format: LogFormat,
}

/// PEM blocks often arrive through env files quoted and with escaped newlines.
fn clean_pem(raw: &str) -> String {
  raw.trim().trim_matches('"').trim_matches('\'').replace("\\n", "\n")
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let optional = |var_name: &str| get_env(var_name).ok().filter(|v| !v.trim().is_empty());
    let parse_num = |var_name: &str, default: &str| -> Result<u64> {
      get_env(var_name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = u32::try_from(parse_num("DATABASE_MAX_CONNECTIONS", "10")?)
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let backend_url = get_env("BACKEND_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));
    let frontend_url = get_env("FRONTEND_URL").unwrap_or_else(|_| backend_url.clone());

    let santimpay_base_url =
      get_env("SANTIMPAY_BASE_URL").unwrap_or_else(|_| "https://gateway.santimpay.com/api".to_string());
    let merchant_id = get_env("GATEWAY_MERCHANT_ID")?;
    let private_key_pem = match optional("PRIVATE_KEY_IN_PEM") {
      Some(inline) => clean_pem(&inline),
      None => {
        let path = optional("PRIVATE_KEY_PATH").ok_or_else(|| {
          AppError::Config("Either PRIVATE_KEY_IN_PEM or PRIVATE_KEY_PATH must be set".to_string())
        })?;
        let contents = std::fs::read_to_string(&path)
          .map_err(|e| AppError::Config(format!("Cannot read PRIVATE_KEY_PATH '{}': {}", path, e)))?;
        clean_pem(&contents)
      }
    };
    let payment_option = get_env("PAYMENT_OPTION").unwrap_or_else(|_| "santimpay".to_string());

    let sms_base_url = get_env("GEEZSMS_BASE_URL").unwrap_or_else(|_| "https://api.geezsms.com/api/v1".to_string());
    let sms_token = get_env("GEEZSMS_TOKEN")?;
    let sms_shortcode_id = optional("GEEZSMS_SHORTCODE_ID");
    let sms_callback_url = optional("GEEZSMS_WEBHOOK_URL");
    let sms_country_code = get_env("SMS_COUNTRY_CODE").unwrap_or_else(|_| "251".to_string());

    let display_offset_minutes = get_env("DISPLAY_UTC_OFFSET_MINUTES")
      .unwrap_or_else(|_| "180".to_string())
      .parse::<i32>()
      .map_err(|e| AppError::Config(format!("Invalid DISPLAY_UTC_OFFSET_MINUTES: {}", e)))?;
    let http_timeout = Duration::from_secs(parse_num("HTTP_TIMEOUT_SECS", "10")?);

    let appointment_reminder_hours = i64::try_from(parse_num("APPOINTMENT_REMINDER_HOURS", "24")?)
      .map_err(|e| AppError::Config(format!("Invalid APPOINTMENT_REMINDER_HOURS: {}", e)))?;
    let reminder_interval = Duration::from_secs(parse_num("REMINDER_INTERVAL_SECS", "3600")?.max(1));
    let appointment_reminder_days_ahead = u32::try_from(parse_num("APPOINTMENT_REMINDER_DAYS_AHEAD", "3")?)
      .map_err(|e| AppError::Config(format!("Invalid APPOINTMENT_REMINDER_DAYS_AHEAD: {}", e)))?;
    let day_ahead_reminder_interval =
      Duration::from_secs(parse_num("DAY_AHEAD_REMINDER_INTERVAL_SECS", "86400")?.max(1));
    let follow_up_interval = Duration::from_secs(parse_num("FOLLOW_UP_INTERVAL_SECS", "86400")?.max(1));
    let fulfillment_sweep_interval = Duration::from_secs(parse_num("FULFILLMENT_SWEEP_INTERVAL_SECS", "600")?.max(1));

    let log_format = match get_env("LOG_FORMAT").unwrap_or_default().to_ascii_lowercase().as_str() {
      "json" => LogFormat::Json,
      "" | "text" => LogFormat::Text,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected text or json", other))),
    };

    // Secrets (DATABASE_URL, key material, SMS token) are never logged.
    tracing::info!(
      server = %format!("{}:{}", server_host, server_port),
      payment_option = %payment_option,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      frontend_url,
      backend_url,
      santimpay_base_url,
      merchant_id,
      private_key_pem,
      payment_option,
      sms_base_url,
      sms_token,
      sms_shortcode_id,
      sms_callback_url,
      sms_country_code,
      display_offset_minutes,
      http_timeout,
      appointment_reminder_hours,
      reminder_interval,
      appointment_reminder_days_ahead,
      day_ahead_reminder_interval,
      follow_up_interval,
      fulfillment_sweep_interval,
      log_format,
    })
  }

  pub fn notifier_config(&self) -> NotifierConfig {
    NotifierConfig {
      country_code: self.sms_country_code.clone(),
      display_offset: offset_from_minutes(self.display_offset_minutes),
      mode: DispatchMode::Detached,
    }
  }

  pub fn gateway_config(&self) -> GatewayConfig {
    GatewayConfig {
      merchant_id: self.merchant_id.clone(),
      country_code: self.sms_country_code.clone(),
    }
  }

  pub fn workflow_config(&self) -> WorkflowConfig {
    WorkflowConfig::from_base_urls(&self.frontend_url, &self.backend_url, &self.payment_option)
  }

  pub fn reminder_config(&self) -> ReminderConfig {
    ReminderConfig {
      window: ReminderWindow::Within(chrono::Duration::hours(self.appointment_reminder_hours)),
      local_offset: offset_from_minutes(self.display_offset_minutes),
    }
  }

  /// Whole local day `appointment_reminder_days_ahead` days out. Shares the
  /// reminder flag with [`reminder_config`](Self::reminder_config), so each
  /// entity is reminded by whichever scan reaches it first.
  pub fn day_ahead_reminder_config(&self) -> ReminderConfig {
    ReminderConfig {
      window: ReminderWindow::DaysAhead(self.appointment_reminder_days_ahead),
      local_offset: offset_from_minutes(self.display_offset_minutes),
    }
  }
}
