// core/src/gateway/santimpay.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::error::{BookingError, BookingResult};
use crate::notify::normalize_phone;
use crate::ports::{
  CheckoutRequest, CheckoutSession, GatewayTransport, PaymentGateway, ProviderStatus, ProviderVerification,
  TokenSigner,
};

const SERVICE: &str = "santimpay";

/// Amounts travel as JSON numbers on the wire.
fn amount_value(amount: Decimal) -> JsonValue {
  amount
    .to_f64()
    .map(|a| json!(a))
    .unwrap_or_else(|| JsonValue::String(amount.to_string()))
}

/// [`PaymentGateway`] backed by SantimPay's hosted checkout.
pub struct SantimPayAdapter {
  transport: Arc<dyn GatewayTransport>,
  signer: Arc<dyn TokenSigner>,
  config: GatewayConfig,
}

impl SantimPayAdapter {
  pub fn new(transport: Arc<dyn GatewayTransport>, signer: Arc<dyn TokenSigner>, config: GatewayConfig) -> Self {
    Self {
      transport,
      signer,
      config,
    }
  }

  /// Signs `{amount, paymentReason, merchantId, generated}`.
  pub fn generate_token(&self, amount: Decimal, payment_reason: &str) -> BookingResult<String> {
    let claims = json!({
      "amount": amount_value(amount),
      "paymentReason": payment_reason,
      "merchantId": self.config.merchant_id,
      "generated": Utc::now().timestamp(),
    });
    self.signer.sign(&claims)
  }

  /// Formats a payer phone the way the gateway expects it: `+<cc>9xxxxxxxx`.
  pub fn format_payer_phone(&self, phone: &str) -> BookingResult<String> {
    normalize_phone(phone, &self.config.country_code).map(|normalized| format!("+{}", normalized))
  }

  pub fn build_initiate_body(&self, request: &CheckoutRequest) -> BookingResult<JsonValue> {
    let reason = request
      .description
      .clone()
      .filter(|d| !d.trim().is_empty())
      .unwrap_or_else(|| format!("Payment for order #{}", request.order_id));
    let signed_token = self.generate_token(request.amount, &reason)?;

    let mut body = json!({
      "id": request.reference,
      "amount": amount_value(request.amount),
      "reason": reason,
      "merchantId": self.config.merchant_id,
      "signedToken": signed_token,
      "successRedirectUrl": request.success_url,
      "failureRedirectUrl": request.failure_url,
      "notifyUrl": request.notify_url,
    });
    if let Some(phone) = request.payer_phone.as_deref() {
      body["phoneNumber"] = JsonValue::String(self.format_payer_phone(phone)?);
    }
    Ok(body)
  }
}

fn string_field<'a>(value: &'a JsonValue, names: &[&str]) -> Option<&'a str> {
  names
    .iter()
    .find_map(|name| value.get(*name).and_then(JsonValue::as_str))
    .filter(|s| !s.is_empty())
}

/// Extracts the checkout URL (required) and the provider's own id (optional).
pub fn parse_initiate_response(response: &JsonValue) -> BookingResult<CheckoutSession> {
  let redirect_url = string_field(response, &["url", "paymentUrl"])
    .ok_or_else(|| BookingError::external(SERVICE, format!("initiate response has no checkout url: {}", response)))?;
  let provider_reference = string_field(response, &["id", "txnId"])
    .map(String::from)
    .or_else(|| response.get("id").filter(|v| v.is_number()).map(|v| v.to_string()));
  Ok(CheckoutSession {
    redirect_url: redirect_url.to_string(),
    provider_reference,
  })
}

/// Maps a provider status word onto the three outcomes the workflow distinguishes.
pub fn parse_provider_status(raw: &str) -> ProviderStatus {
  match raw.trim().to_ascii_uppercase().as_str() {
    "COMPLETED" | "SUCCESS" | "SUCCEEDED" => ProviderStatus::Completed,
    "PENDING" | "PROCESSING" | "INITIATED" | "" => ProviderStatus::Pending,
    _ => ProviderStatus::Failed,
  }
}

pub fn parse_verify_response(response: JsonValue) -> BookingResult<ProviderVerification> {
  let payload = response.get("data").filter(|d| d.is_object()).unwrap_or(&response);
  let status_word = string_field(payload, &["status", "Status", "paymentStatus"])
    .ok_or_else(|| BookingError::external(SERVICE, format!("verify response has no status: {}", response)))?;
  let status = parse_provider_status(status_word);
  let provider_transaction_id = string_field(payload, &["txnId", "id"]).map(String::from);
  let amount = payload
    .get("amount")
    .and_then(|v| serde_json::from_value::<Decimal>(v.clone()).ok());
  Ok(ProviderVerification {
    status,
    provider_transaction_id,
    amount,
    raw: response,
  })
}

#[async_trait]
impl PaymentGateway for SantimPayAdapter {
  #[instrument(
    name = "SantimPayAdapter::initiate_external_payment",
    skip(self, request),
    fields(reference = %request.reference, amount = %request.amount),
    err(Display)
  )]
  async fn initiate_external_payment(&self, request: &CheckoutRequest) -> BookingResult<CheckoutSession> {
    let body = self.build_initiate_body(request)?;
    debug!(has_phone = request.payer_phone.is_some(), "Initiate request prepared.");

    let response = self.transport.post_json("/initiate-payment", &body).await?;
    let session = parse_initiate_response(&response)?;
    info!(provider_reference = ?session.provider_reference, "Checkout session opened.");
    Ok(session)
  }

  #[instrument(name = "SantimPayAdapter::verify_external_payment", skip(self), err(Display))]
  async fn verify_external_payment(&self, reference: &str) -> BookingResult<ProviderVerification> {
    let token = self.generate_token(Decimal::ZERO, reference)?;
    let path = format!("/v1/payment/verify/{}", reference);
    let response = self.transport.get_json(&path, &token).await?;
    let verification = parse_verify_response(response)?;
    if verification.status == ProviderStatus::Failed {
      warn!("Provider reports the payment as failed.");
    }
    Ok(verification)
  }
}
