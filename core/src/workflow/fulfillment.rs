// core/src/workflow/fulfillment.rs

use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::payment::PaymentWorkflow;
use crate::domain::{Order, Payment, PaymentStatus, Reservation};
use crate::error::{BookingError, BookingResult};
use crate::notify::{NotificationEvent, TemplateContext};

/// What fulfillment achieved for one completed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Fulfillment {
  Reserved { reservation: Reservation },
  /// A reservation for the order existed already.
  AlreadyReserved,
  /// Order data does not describe a reservation (logged by the deriver).
  NoReservation,
  /// Payment is completed but the order or reservation could not be updated.
  Incomplete { reason: String },
}

impl PaymentWorkflow {
  /// Marks the order paid, creates its reservation, then sends the payment
  /// confirmation if this run is the one that marked the order paid.
  ///
  /// Safe to run repeatedly for the same payment: `mark_paid` is a no-op on an
  /// already settled order and the reservation insert is keyed by order. A
  /// failure here leaves a completed payment without fulfillment, which is
  /// logged and picked up again by [`resume_fulfillment`](Self::resume_fulfillment).
  #[instrument(
    name = "PaymentWorkflow::fulfill",
    skip(self, payment),
    fields(payment_id = %payment.id, order_id = %payment.order_id)
  )]
  pub(super) async fn fulfill(&self, payment: &Payment) -> Fulfillment {
    match self.try_fulfill(payment).await {
      Ok(outcome) => outcome,
      Err(err) => {
        error!(
          reference = %payment.reference,
          error = %err,
          "Payment completed but fulfillment is pending; requires reconciliation."
        );
        Fulfillment::Incomplete { reason: err.to_string() }
      }
    }
  }

  async fn try_fulfill(&self, payment: &Payment) -> BookingResult<Fulfillment> {
    let order = self
      .stores
      .orders
      .get(payment.order_id)
      .await?
      .ok_or_else(|| BookingError::not_found("order", payment.order_id))?;

    let newly_paid = self.stores.orders.mark_paid(order.id).await?;
    if newly_paid {
      info!("Order marked paid.");
    }

    let outcome = self.reserve(&order).await;

    // Only the run that actually moves the order sends the confirmation, and
    // only once the reservation step has run.
    if newly_paid {
      self.send_payment_confirmation(&order, payment).await;
    }
    outcome
  }

  async fn reserve(&self, order: &Order) -> BookingResult<Fulfillment> {
    let service = self
      .stores
      .services
      .get_service(order.service_id)
      .await?
      .ok_or_else(|| BookingError::not_found("service", order.service_id))?;

    match self.deriver.derive_or_log(order, &service) {
      None => Ok(Fulfillment::NoReservation),
      Some(spec) => match self.stores.reservations.insert(&spec).await {
        Ok(reservation) => {
          info!(reservation_id = %reservation.id, "Reservation created.");
          Ok(Fulfillment::Reserved { reservation })
        }
        Err(err) if err.is_conflict() => {
          info!("Reservation already exists for order.");
          Ok(Fulfillment::AlreadyReserved)
        }
        Err(err) => Err(err),
      },
    }
  }

  async fn send_payment_confirmation(&self, order: &Order, payment: &Payment) {
    match self.stores.customers.get_customer(order.customer_id).await {
      Ok(Some(customer)) => {
        let context = TemplateContext::new()
          .customer(customer.name)
          .amount(payment.amount)
          .reference(payment.reference.clone());
        self
          .notifier
          .notify_best_effort(NotificationEvent::PaymentConfirmed, customer.phone, context)
          .await;
      }
      Ok(None) => warn!(customer_id = %order.customer_id, "Customer not found; confirmation SMS skipped."),
      Err(err) => warn!(error = %err, "Customer lookup failed; confirmation SMS skipped."),
    }
  }

  /// Re-runs fulfillment for completed payments whose order has no
  /// reservation yet. Returns the outcome per payment.
  #[instrument(name = "PaymentWorkflow::resume_fulfillment", skip(self), err(Display))]
  pub async fn resume_fulfillment(&self, limit: usize) -> BookingResult<Vec<(Uuid, Fulfillment)>> {
    let pending = self.stores.payments.completed_without_reservation(limit).await?;
    if pending.is_empty() {
      return Ok(Vec::new());
    }
    info!(count = pending.len(), "Resuming fulfillment for completed payments.");

    let mut outcomes = Vec::with_capacity(pending.len());
    for payment in pending {
      if payment.status != PaymentStatus::Completed {
        continue;
      }
      let outcome = self.fulfill(&payment).await;
      outcomes.push((payment.id, outcome));
    }
    Ok(outcomes)
  }
}
