// server/src/services/geez_sms.rs

use async_trait::async_trait;
use bookwell::notify::mask_phone;
use bookwell::ports::{SmsReceipt, SmsSender};
use bookwell::{BookingError, BookingResult};
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};

const SERVICE: &str = "geezsms";

/// Single-message sender for the GeezSMS form API.
#[derive(Clone)]
pub struct GeezSmsSender {
  client: reqwest::Client,
  base_url: String,
  token: String,
  shortcode_id: Option<String>,
  callback_url: Option<String>,
}

impl GeezSmsSender {
  pub fn new(
    client: reqwest::Client,
    base_url: &str,
    token: String,
    shortcode_id: Option<String>,
    callback_url: Option<String>,
  ) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
      shortcode_id,
      callback_url,
    }
  }
}

#[async_trait]
impl SmsSender for GeezSmsSender {
  #[instrument(
    name = "GeezSmsSender::send_sms",
    skip(self, phone, message),
    fields(phone = %mask_phone(phone), msg_len = message.len()),
    err(Display)
  )]
  async fn send_sms(&self, phone: &str, message: &str) -> BookingResult<SmsReceipt> {
    let mut form: Vec<(&str, &str)> = vec![("token", self.token.as_str()), ("phone", phone), ("msg", message)];
    if let Some(shortcode_id) = &self.shortcode_id {
      form.push(("shortcode_id", shortcode_id.as_str()));
    }
    if let Some(callback) = &self.callback_url {
      form.push(("callback", callback.as_str()));
    }

    let response = self
      .client
      .post(format!("{}/sms/send", self.base_url))
      .form(&form)
      .send()
      .await
      .map_err(|e| BookingError::external(SERVICE, format!("No response from SMS service: {}", e)))?;

    let status = response.status();
    let body: JsonValue = response.json().await.unwrap_or(JsonValue::Null);
    if !status.is_success() {
      let message = body
        .get("message")
        .and_then(JsonValue::as_str)
        .unwrap_or("No error message from server");
      warn!(http_status = %status, "SMS provider rejected the message.");
      return Err(BookingError::external(
        SERVICE,
        format!("SMS API Error ({}): {}", status.as_u16(), message),
      ));
    }

    let provider_message_id = body.get("api_log_id").and_then(|id| match id {
      JsonValue::String(s) => Some(s.clone()),
      JsonValue::Number(n) => Some(n.to_string()),
      _ => None,
    });
    info!(message_id = ?provider_message_id, "SMS accepted by provider.");
    Ok(SmsReceipt { provider_message_id })
  }
}
