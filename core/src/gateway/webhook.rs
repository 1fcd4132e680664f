// core/src/gateway/webhook.rs

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{BookingError, BookingResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWebhook {
  #[serde(default, alias = "txnId")]
  provider_txn_id: Option<String>,
  #[serde(default, alias = "Status")]
  status: Option<String>,
  #[serde(default, alias = "thirdPartyId")]
  correlation_reference: Option<String>,
  #[serde(default)]
  amount: Option<JsonValue>,
  #[serde(default, alias = "msisdn")]
  payer_phone: Option<String>,
}

/// A payment provider callback, normalized.
///
/// Accepts the provider's native field names (`txnId`, `Status`,
/// `thirdPartyId`, `msisdn`) as well as `providerTxnId`, `status`,
/// `correlationReference`, `payerPhone`. The untouched body is kept in `raw`
/// so it can be stored with the payment.
///
/// An `amount` that is neither a number nor a numeric string does not reject
/// the callback; it is kept in `invalid_amount` and `amount` is left empty.
#[derive(Debug, Clone)]
pub struct WebhookPayload {
  pub provider_txn_id: Option<String>,
  pub status: String,
  pub correlation_reference: String,
  pub amount: Option<Decimal>,
  pub invalid_amount: Option<JsonValue>,
  pub payer_phone: Option<String>,
  pub raw: JsonValue,
}

impl WebhookPayload {
  pub fn from_json(raw: JsonValue) -> BookingResult<Self> {
    let parsed: RawWebhook = serde_json::from_value(raw.clone())
      .map_err(|e| BookingError::Validation(format!("Malformed webhook payload: {}", e)))?;

    let correlation_reference = parsed
      .correlation_reference
      .map(|r| r.trim().to_string())
      .filter(|r| !r.is_empty())
      .ok_or_else(|| BookingError::Validation("Webhook payload has no correlation reference".to_string()))?;

    let (amount, invalid_amount) = match parsed.amount {
      None | Some(JsonValue::Null) => (None, None),
      Some(value) => match parse_amount(&value) {
        Some(amount) => (Some(amount), None),
        None => (None, Some(value)),
      },
    };

    Ok(Self {
      provider_txn_id: parsed.provider_txn_id.filter(|id| !id.is_empty()),
      status: parsed.status.unwrap_or_default(),
      correlation_reference,
      amount,
      invalid_amount,
      payer_phone: parsed.payer_phone,
      raw,
    })
  }

  pub fn from_slice(body: &[u8]) -> BookingResult<Self> {
    let raw: JsonValue = serde_json::from_slice(body)
      .map_err(|e| BookingError::Validation(format!("Webhook body is not JSON: {}", e)))?;
    Self::from_json(raw)
  }
}

fn parse_amount(value: &JsonValue) -> Option<Decimal> {
  match value {
    JsonValue::Number(n) => n.to_string().parse::<Decimal>().ok(),
    JsonValue::String(s) => {
      let trimmed = s.trim();
      if trimmed.is_empty() {
        None
      } else {
        trimmed.parse::<Decimal>().ok()
      }
    }
    _ => None,
  }
}
