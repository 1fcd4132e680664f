// core/src/workflow/payment.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::reference::generate_reference;
use crate::config::WorkflowConfig;
use crate::domain::{NewPayment, Order, OrderStatus, Payment, PaymentStatus, PaymentSummary, Settlement};
use crate::error::{BookingError, BookingResult};
use crate::gateway::WebhookPayload;
use crate::notify::{normalize_phone, NotificationDispatcher, NotificationEvent, TemplateContext};
use crate::ports::{CheckoutRequest, CheckoutSession, PaymentGateway, ProviderStatus, Stores};
use crate::reservation::ReservationDeriver;

/// Reference collisions are astronomically unlikely; a couple of fresh draws is plenty.
const REFERENCE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePayment {
  pub order_id: Uuid,
  pub amount: Decimal,
  #[serde(default)]
  pub phone_number: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatedPayment {
  pub payment_id: Uuid,
  pub redirect_url: String,
  pub reference: String,
}

/// What reconciliation did with a provider callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
  /// The pending payment moved to `status`.
  Applied { status: PaymentStatus },
  /// The payment was already terminal; nothing changed.
  Duplicate { status: PaymentStatus },
  UnknownReference,
  /// Processing failed internally. Logged; still acknowledged to the provider.
  Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
  pub handled: bool,
  pub payment_id: Option<Uuid>,
  #[serde(flatten)]
  pub outcome: WebhookOutcome,
}

impl WebhookAck {
  fn new(payment_id: Option<Uuid>, outcome: WebhookOutcome) -> Self {
    let handled = !matches!(outcome, WebhookOutcome::Failed { .. });
    Self {
      handled,
      payment_id,
      outcome,
    }
  }
}

/// Result of pushing a settlement through the conditional update.
pub(super) enum SettleResult {
  Applied(Payment),
  AlreadySettled(PaymentStatus),
}

/// Orchestrates payment initiation and reconciliation across payments, orders
/// and reservations.
#[derive(Clone)]
pub struct PaymentWorkflow {
  pub(super) stores: Stores,
  gateway: Arc<dyn PaymentGateway>,
  pub(super) notifier: NotificationDispatcher,
  config: Arc<WorkflowConfig>,
  pub(super) deriver: ReservationDeriver,
}

impl PaymentWorkflow {
  pub fn new(
    stores: Stores,
    gateway: Arc<dyn PaymentGateway>,
    notifier: NotificationDispatcher,
    config: WorkflowConfig,
  ) -> Self {
    Self {
      stores,
      gateway,
      notifier,
      config: Arc::new(config),
      deriver: ReservationDeriver::new(),
    }
  }

  pub fn stores(&self) -> &Stores {
    &self.stores
  }

  /// Opens a hosted checkout for `request.order_id`.
  ///
  /// The pending payment is reserved first, the gateway is called with no
  /// storage transaction open, and the checkout URL is attached afterwards.
  /// If the gateway call (or the attach) fails, the pending row is removed
  /// and `PaymentInitiationFailed` is returned. The payment-link SMS is sent
  /// only after success and its outcome never affects the result.
  ///
  /// Only pending orders accept a payment; paid or cancelled orders yield
  /// `Conflict` before anything is stored.
  #[instrument(
    name = "PaymentWorkflow::initiate",
    skip(self, request),
    fields(order_id = %request.order_id, amount = %request.amount),
    err(Display)
  )]
  pub async fn initiate(&self, request: InitiatePayment) -> BookingResult<InitiatedPayment> {
    if request.amount <= Decimal::ZERO {
      return Err(BookingError::Validation("Amount must be greater than zero".to_string()));
    }
    if request.amount.normalize().scale() > 2 {
      return Err(BookingError::Validation(
        "Amount must have at most two decimal places".to_string(),
      ));
    }

    let order = self
      .stores
      .orders
      .get(request.order_id)
      .await?
      .ok_or_else(|| BookingError::not_found("order", request.order_id))?;
    if order.status != OrderStatus::Pending {
      return Err(BookingError::Conflict(format!(
        "Order {} is {} and cannot take a new payment",
        order.id, order.status
      )));
    }

    let payer_phone = request
      .phone_number
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(|p| normalize_phone(p, &self.notifier.config().country_code))
      .transpose()
      .map_err(|e| BookingError::Validation(e.to_string()))?;

    let payment = self.reserve_pending(&order, request.amount).await?;
    let reference = payment.reference.clone();
    info!(payment_id = %payment.id, %reference, "Pending payment reserved.");

    let checkout = CheckoutRequest {
      reference: reference.clone(),
      order_id: order.id,
      amount: request.amount,
      payer_phone,
      description: request.description.clone(),
      success_url: self.config.success_url.replace("{reference}", &reference),
      failure_url: self.config.failure_url.replace("{reference}", &reference),
      notify_url: self.config.notify_url.clone(),
    };

    let session = match self.gateway.initiate_external_payment(&checkout).await {
      Ok(session) => session,
      Err(err) => {
        warn!(%reference, error = %err, "Gateway rejected the checkout; discarding pending payment.");
        self.compensate(payment.id, &reference).await;
        return Err(match err {
          BookingError::Configuration(_) => err,
          other => BookingError::PaymentInitiationFailed {
            reference,
            reason: other.to_string(),
          },
        });
      }
    };

    let payment = match self.stores.payments.attach_checkout(payment.id, &session).await {
      Ok(payment) => payment,
      Err(err) => {
        error!(%reference, error = %err, "Could not record the checkout URL; discarding pending payment.");
        self.compensate(payment.id, &reference).await;
        return Err(BookingError::PaymentInitiationFailed {
          reference,
          reason: err.to_string(),
        });
      }
    };

    info!(payment_id = %payment.id, reference = %payment.reference, "Checkout opened.");
    self.send_payment_link(&order, &payment, &session).await;

    Ok(InitiatedPayment {
      payment_id: payment.id,
      redirect_url: session.redirect_url,
      reference: payment.reference,
    })
  }

  async fn reserve_pending(&self, order: &Order, amount: Decimal) -> BookingResult<Payment> {
    let mut attempt = 0;
    loop {
      attempt += 1;
      let new_payment = NewPayment {
        order_id: order.id,
        amount,
        payment_option: self.config.payment_option.clone(),
        reference: generate_reference(chrono::Utc::now()),
      };
      match self.stores.payments.insert_pending(new_payment).await {
        Err(err) if err.is_conflict() && attempt < REFERENCE_ATTEMPTS => {
          warn!(attempt, "Generated payment reference collided; drawing another.");
        }
        result => return result,
      }
    }
  }

  async fn compensate(&self, payment_id: Uuid, reference: &str) {
    if let Err(err) = self.stores.payments.discard_pending(payment_id).await {
      error!(
        %payment_id,
        %reference,
        error = %err,
        "Failed to discard pending payment after initiation failure; row needs manual cleanup."
      );
    }
  }

  async fn send_payment_link(&self, order: &Order, payment: &Payment, session: &CheckoutSession) {
    let customer = match self.stores.customers.get_customer(order.customer_id).await {
      Ok(Some(customer)) => customer,
      Ok(None) => {
        warn!(customer_id = %order.customer_id, "Customer not found; payment link SMS skipped.");
        return;
      }
      Err(err) => {
        warn!(error = %err, "Customer lookup failed; payment link SMS skipped.");
        return;
      }
    };

    let context = TemplateContext::new()
      .customer(customer.name)
      .url(session.redirect_url.clone())
      .amount(payment.amount)
      .reference(payment.reference.clone());
    self
      .notifier
      .notify_best_effort(NotificationEvent::PaymentLink, customer.phone, context)
      .await;
  }

  /// Convenience for transports that hand over the raw callback body.
  /// A body that cannot be parsed is acknowledged as not handled.
  pub async fn reconcile_webhook_body(&self, body: &[u8]) -> WebhookAck {
    match WebhookPayload::from_slice(body) {
      Ok(payload) => self.reconcile_webhook(payload).await,
      Err(err) => {
        warn!(error = %err, "Unparseable webhook body acknowledged without changes.");
        WebhookAck::new(None, WebhookOutcome::Failed { reason: err.to_string() })
      }
    }
  }

  /// Applies a provider callback. Never fails: every internal problem is
  /// logged and reported through the returned acknowledgement.
  #[instrument(
    name = "PaymentWorkflow::reconcile_webhook",
    skip(self, payload),
    fields(reference = %payload.correlation_reference, provider_status = %payload.status)
  )]
  pub async fn reconcile_webhook(&self, payload: WebhookPayload) -> WebhookAck {
    let existing = match self.stores.payments.find_by_reference(&payload.correlation_reference).await {
      Ok(Some(payment)) => payment,
      Ok(None) => {
        warn!("Webhook for unknown payment reference; acknowledged without changes.");
        return WebhookAck::new(None, WebhookOutcome::UnknownReference);
      }
      Err(err) => {
        error!(error = %err, "Payment lookup failed while handling webhook.");
        return WebhookAck::new(None, WebhookOutcome::Failed { reason: err.to_string() });
      }
    };

    if existing.status.is_terminal() {
      info!(payment_id = %existing.id, status = %existing.status, "Duplicate webhook delivery ignored.");
      return WebhookAck::new(Some(existing.id), WebhookOutcome::Duplicate { status: existing.status });
    }

    let status = PaymentStatus::from_webhook_status(&payload.status);
    let mut metadata = json!({ "webhook": payload.raw });
    if let Some(received) = payload.amount {
      if received != existing.amount {
        warn!(
          expected = %existing.amount,
          %received,
          "Webhook amount differs from the recorded payment amount."
        );
        metadata["amountMismatch"] = json!({
          "expected": existing.amount.to_string(),
          "received": received.to_string(),
        });
      }
    }
    if let Some(invalid) = payload.invalid_amount {
      warn!(received = %invalid, "Webhook amount is not a number; recorded as-is.");
      metadata["invalidAmount"] = invalid;
    }

    let settlement = Settlement {
      status,
      provider_transaction_id: payload.provider_txn_id,
      metadata,
    };

    match self.settle(&existing, &settlement).await {
      Ok(SettleResult::Applied(_)) => WebhookAck::new(Some(existing.id), WebhookOutcome::Applied { status }),
      Ok(SettleResult::AlreadySettled(current)) => {
        WebhookAck::new(Some(existing.id), WebhookOutcome::Duplicate { status: current })
      }
      Err(err) => {
        error!(payment_id = %existing.id, error = %err, "Settlement failed while handling webhook.");
        WebhookAck::new(Some(existing.id), WebhookOutcome::Failed { reason: err.to_string() })
      }
    }
  }

  /// Conditional pending -> terminal write, then fulfillment when the
  /// payment completed. Losing a race to another delivery is not an error.
  pub(super) async fn settle(&self, existing: &Payment, settlement: &Settlement) -> BookingResult<SettleResult> {
    existing.status.ensure_transition(settlement.status)?;

    let updated = self
      .stores
      .payments
      .settle_if_pending(&existing.reference, settlement)
      .await?;

    let Some(updated) = updated else {
      let current = self
        .stores
        .payments
        .find_by_reference(&existing.reference)
        .await?
        .map(|p| p.status)
        .unwrap_or(settlement.status);
      info!(payment_id = %existing.id, status = %current, "Payment settled concurrently; nothing to apply.");
      return Ok(SettleResult::AlreadySettled(current));
    };

    info!(payment_id = %updated.id, status = %updated.status, "Payment settled.");
    if updated.status == PaymentStatus::Completed {
      self.fulfill(&updated).await;
    }
    Ok(SettleResult::Applied(updated))
  }

  /// Read-only lookup by reference.
  #[instrument(name = "PaymentWorkflow::verify", skip(self), err(Display))]
  pub async fn verify(&self, reference: &str) -> BookingResult<PaymentSummary> {
    self
      .stores
      .payments
      .find_by_reference(reference)
      .await?
      .map(|payment| payment.summary())
      .ok_or_else(|| BookingError::not_found("payment", reference))
  }

  /// Asks the provider for the transaction status and applies a final result
  /// through the same conditional settlement as webhooks. A provider that
  /// still reports the transaction as pending changes nothing.
  #[instrument(name = "PaymentWorkflow::refresh_from_provider", skip(self), err(Display))]
  pub async fn refresh_from_provider(&self, reference: &str) -> BookingResult<PaymentSummary> {
    let existing = self
      .stores
      .payments
      .find_by_reference(reference)
      .await?
      .ok_or_else(|| BookingError::not_found("payment", reference))?;

    if existing.status.is_terminal() {
      return Ok(existing.summary());
    }

    let verification = self.gateway.verify_external_payment(reference).await?;
    let status = match verification.status {
      ProviderStatus::Pending => {
        info!("Provider still reports the payment as pending.");
        return Ok(existing.summary());
      }
      ProviderStatus::Completed => PaymentStatus::Completed,
      ProviderStatus::Failed => PaymentStatus::Failed,
    };

    let settlement = Settlement {
      status,
      provider_transaction_id: verification.provider_transaction_id,
      metadata: json!({ "verification": verification.raw }),
    };
    let summary = match self.settle(&existing, &settlement).await? {
      SettleResult::Applied(updated) => updated.summary(),
      SettleResult::AlreadySettled(current) => PaymentSummary {
        status: current,
        ..existing.summary()
      },
    };
    Ok(summary)
  }
}
