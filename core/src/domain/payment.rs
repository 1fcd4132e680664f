// core/src/domain/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{invalid_transition, unknown_status};
use crate::error::{BookingError, BookingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Completed,
  Failed,
  Cancelled,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Completed => "completed",
      PaymentStatus::Failed => "failed",
      PaymentStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(self) -> bool {
    !matches!(self, PaymentStatus::Pending)
  }

  /// A payment leaves `pending` exactly once and never moves again.
  pub fn can_transition_to(self, next: PaymentStatus) -> bool {
    matches!(
      (self, next),
      (
        PaymentStatus::Pending,
        PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Cancelled
      )
    )
  }

  pub fn ensure_transition(self, next: PaymentStatus) -> BookingResult<()> {
    if self.can_transition_to(next) {
      Ok(())
    } else {
      Err(invalid_transition("payment", self, next))
    }
  }

  /// Webhook status mapping: only an explicit COMPLETED counts as paid.
  pub fn from_webhook_status(raw: &str) -> Self {
    if raw.trim().eq_ignore_ascii_case("COMPLETED") {
      PaymentStatus::Completed
    } else {
      PaymentStatus::Failed
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentStatus {
  type Err = BookingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(PaymentStatus::Pending),
      "completed" => Ok(PaymentStatus::Completed),
      "failed" => Ok(PaymentStatus::Failed),
      "cancelled" => Ok(PaymentStatus::Cancelled),
      other => Err(unknown_status("payment", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
  pub id: Uuid,
  pub order_id: Uuid,
  pub amount: Decimal,
  pub payment_option: String,
  pub status: PaymentStatus,
  /// Idempotency and correlation key generated at initiation. Unique.
  pub reference: String,
  pub provider_transaction_id: Option<String>,
  /// Opaque provider data: checkout URL, raw webhook bodies, verification results.
  pub metadata: JsonValue,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Payment {
  pub fn checkout_url(&self) -> Option<&str> {
    self.metadata.get("checkoutUrl").and_then(JsonValue::as_str)
  }

  pub fn summary(&self) -> PaymentSummary {
    PaymentSummary {
      reference: self.reference.clone(),
      status: self.status,
      amount: self.amount,
      created_at: self.created_at,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
  pub order_id: Uuid,
  pub amount: Decimal,
  pub payment_option: String,
  pub reference: String,
}

/// Terminal outcome applied to a pending payment, together with whatever the
/// provider reported about it.
#[derive(Debug, Clone)]
pub struct Settlement {
  pub status: PaymentStatus,
  pub provider_transaction_id: Option<String>,
  /// Merged into the existing metadata, never replacing it.
  pub metadata: JsonValue,
}

/// Read-only view returned by the verify endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
  pub reference: String,
  pub status: PaymentStatus,
  pub amount: Decimal,
  pub created_at: DateTime<Utc>,
}

/// Shallow-merges `patch` into `target`. Keys present in `patch` win; a
/// non-object target is replaced by an empty object first.
pub fn merge_metadata(target: &mut JsonValue, patch: JsonValue) {
  if !target.is_object() {
    *target = JsonValue::Object(Map::new());
  }
  if let (Some(existing), JsonValue::Object(incoming)) = (target.as_object_mut(), patch) {
    for (key, value) in incoming {
      existing.insert(key, value);
    }
  }
}
