// core/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
  merge_metadata, Appointment, AppointmentStatus, Customer, NewAppointment, NewOrder, NewPayment, Order, OrderStatus,
  Payment, PaymentStatus, Reservation, ReservationSpec, Service, ServiceType, Settlement,
};
use crate::error::{BookingError, BookingResult};
use crate::ports::{
  AppointmentStore, CheckoutSession, CustomerDirectory, OrderStore, PaymentStore, ReservationStore, ServiceCatalog,
  Stores,
};

#[derive(Default)]
struct MemoryState {
  customers: HashMap<Uuid, Customer>,
  services: HashMap<Uuid, Service>,
  orders: HashMap<Uuid, Order>,
  payments: HashMap<Uuid, Payment>,
  reservations: HashMap<Uuid, Reservation>,
  appointments: HashMap<Uuid, Appointment>,
  fail_reservation_inserts: bool,
}

impl MemoryState {
  fn payment_by_reference_mut(&mut self, reference: &str) -> Option<&mut Payment> {
    self.payments.values_mut().find(|p| p.reference == reference)
  }

  fn has_reservation(&self, order_id: Uuid) -> bool {
    self.reservations.values().any(|r| r.order_id == order_id)
  }
}

/// Every storage port over a single lock. Each port method takes the lock
/// once, so conditional updates are atomic exactly like their SQL versions.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn into_stores(self) -> Stores {
    let store = Arc::new(self);
    Stores {
      payments: store.clone(),
      orders: store.clone(),
      reservations: store.clone(),
      appointments: store.clone(),
      services: store.clone(),
      customers: store,
    }
  }

  // --- Seeding ---

  pub fn insert_customer(&self, name: &str, phone: &str) -> Customer {
    let customer = Customer {
      id: Uuid::new_v4(),
      name: name.to_string(),
      phone: phone.to_string(),
    };
    self.state.write().customers.insert(customer.id, customer.clone());
    customer
  }

  pub fn insert_service(&self, name: &str, service_type: ServiceType, cost: Decimal) -> Service {
    let (cost_per_date, cost_per_service) = match service_type {
      ServiceType::PerDate => (Some(cost), None),
      ServiceType::Fixed => (None, Some(cost)),
    };
    let service = Service {
      id: Uuid::new_v4(),
      name: name.to_string(),
      service_type,
      cost_per_date,
      cost_per_service,
    };
    self.state.write().services.insert(service.id, service.clone());
    service
  }

  /// Stores `order` as given, replacing any order with the same id.
  pub fn put_order(&self, order: Order) {
    self.state.write().orders.insert(order.id, order);
  }

  pub fn put_appointment(&self, appointment: Appointment) {
    self.state.write().appointments.insert(appointment.id, appointment);
  }

  /// Makes every reservation insert fail with a storage error until cleared.
  pub fn fail_reservation_inserts(&self, fail: bool) {
    self.state.write().fail_reservation_inserts = fail;
  }

  // --- Inspection ---

  pub fn payments(&self) -> Vec<Payment> {
    let mut payments: Vec<Payment> = self.state.read().payments.values().cloned().collect();
    payments.sort_by_key(|p| p.created_at);
    payments
  }

  pub fn reservations(&self) -> Vec<Reservation> {
    self.state.read().reservations.values().cloned().collect()
  }

  pub fn order(&self, order_id: Uuid) -> Option<Order> {
    self.state.read().orders.get(&order_id).cloned()
  }

  pub fn appointment(&self, appointment_id: Uuid) -> Option<Appointment> {
    self.state.read().appointments.get(&appointment_id).cloned()
  }
}

#[async_trait]
impl PaymentStore for MemoryStore {
  async fn insert_pending(&self, payment: NewPayment) -> BookingResult<Payment> {
    let mut state = self.state.write();
    if state.payments.values().any(|p| p.reference == payment.reference) {
      return Err(BookingError::Conflict(format!(
        "Payment reference '{}' already exists",
        payment.reference
      )));
    }
    let now = Utc::now();
    let stored = Payment {
      id: Uuid::new_v4(),
      order_id: payment.order_id,
      amount: payment.amount,
      payment_option: payment.payment_option,
      status: PaymentStatus::Pending,
      reference: payment.reference,
      provider_transaction_id: None,
      metadata: json!({}),
      created_at: now,
      updated_at: now,
    };
    state.payments.insert(stored.id, stored.clone());
    Ok(stored)
  }

  async fn attach_checkout(&self, payment_id: Uuid, checkout: &CheckoutSession) -> BookingResult<Payment> {
    let mut state = self.state.write();
    let payment = state
      .payments
      .get_mut(&payment_id)
      .ok_or_else(|| BookingError::not_found("payment", payment_id))?;
    if payment.status != PaymentStatus::Pending {
      return Err(BookingError::Conflict(format!("Payment {} is no longer pending", payment_id)));
    }
    merge_metadata(
      &mut payment.metadata,
      json!({
        "checkoutUrl": checkout.redirect_url,
        "providerReference": checkout.provider_reference,
      }),
    );
    payment.updated_at = Utc::now();
    Ok(payment.clone())
  }

  async fn discard_pending(&self, payment_id: Uuid) -> BookingResult<()> {
    let mut state = self.state.write();
    if state
      .payments
      .get(&payment_id)
      .is_some_and(|p| p.status == PaymentStatus::Pending)
    {
      state.payments.remove(&payment_id);
    }
    Ok(())
  }

  async fn find_by_reference(&self, reference: &str) -> BookingResult<Option<Payment>> {
    Ok(self.state.read().payments.values().find(|p| p.reference == reference).cloned())
  }

  async fn settle_if_pending(&self, reference: &str, settlement: &Settlement) -> BookingResult<Option<Payment>> {
    let mut state = self.state.write();
    let Some(payment) = state.payment_by_reference_mut(reference) else {
      return Ok(None);
    };
    if payment.status != PaymentStatus::Pending {
      return Ok(None);
    }
    payment.status = settlement.status;
    if settlement.provider_transaction_id.is_some() {
      payment.provider_transaction_id = settlement.provider_transaction_id.clone();
    }
    merge_metadata(&mut payment.metadata, settlement.metadata.clone());
    payment.updated_at = Utc::now();
    Ok(Some(payment.clone()))
  }

  async fn completed_without_reservation(&self, limit: usize) -> BookingResult<Vec<Payment>> {
    let state = self.state.read();
    let mut found: Vec<Payment> = state
      .payments
      .values()
      .filter(|p| p.status == PaymentStatus::Completed)
      .filter(|p| match state.orders.get(&p.order_id) {
        Some(order) => match order.status {
          OrderStatus::Pending => true,
          OrderStatus::Cancelled => false,
          _ => order.date.is_some() && !state.has_reservation(order.id),
        },
        None => false,
      })
      .cloned()
      .collect();
    found.sort_by_key(|p| p.created_at);
    found.truncate(limit);
    Ok(found)
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert(&self, order: NewOrder) -> BookingResult<Order> {
    let stored = Order {
      id: Uuid::new_v4(),
      customer_id: order.customer_id,
      service_id: order.service_id,
      package_id: order.package_id,
      description: order.description,
      attached_file_path: order.attached_file_path,
      date: order.date,
      date_count: order.date_count,
      status: OrderStatus::Pending,
      reminder_sent: false,
      created_at: Utc::now(),
    };
    self.state.write().orders.insert(stored.id, stored.clone());
    Ok(stored)
  }

  async fn get(&self, order_id: Uuid) -> BookingResult<Option<Order>> {
    Ok(self.state.read().orders.get(&order_id).cloned())
  }

  async fn mark_paid(&self, order_id: Uuid) -> BookingResult<bool> {
    let mut state = self.state.write();
    let order = state
      .orders
      .get_mut(&order_id)
      .ok_or_else(|| BookingError::not_found("order", order_id))?;
    if order.status.is_settled() {
      return Ok(false);
    }
    order.status.ensure_transition(OrderStatus::Paid)?;
    order.status = OrderStatus::Paid;
    Ok(true)
  }

  async fn due_for_reminder(&self, from: NaiveDate, to: NaiveDate) -> BookingResult<Vec<Order>> {
    Ok(
      self
        .state
        .read()
        .orders
        .values()
        .filter(|o| matches!(o.status, OrderStatus::Paid | OrderStatus::Confirmed) && !o.reminder_sent)
        .filter(|o| o.date.is_some_and(|d| d >= from && d <= to))
        .cloned()
        .collect(),
    )
  }

  async fn claim_reminder(&self, order_id: Uuid) -> BookingResult<bool> {
    let mut state = self.state.write();
    match state.orders.get_mut(&order_id) {
      Some(order) if !order.reminder_sent => {
        order.reminder_sent = true;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn release_reminder(&self, order_id: Uuid) -> BookingResult<()> {
    if let Some(order) = self.state.write().orders.get_mut(&order_id) {
      order.reminder_sent = false;
    }
    Ok(())
  }
}

#[async_trait]
impl ReservationStore for MemoryStore {
  async fn insert(&self, spec: &ReservationSpec) -> BookingResult<Reservation> {
    let mut state = self.state.write();
    if state.fail_reservation_inserts {
      return Err(BookingError::storage(anyhow::anyhow!("reservation insert disabled")));
    }
    if state.has_reservation(spec.order_id) {
      return Err(BookingError::Conflict(format!(
        "Reservation for order {} already exists",
        spec.order_id
      )));
    }
    let reservation = Reservation {
      id: Uuid::new_v4(),
      order_id: spec.order_id,
      period: spec.period,
      status: spec.status,
      created_at: Utc::now(),
    };
    state.reservations.insert(reservation.id, reservation.clone());
    Ok(reservation)
  }

  async fn find_by_order(&self, order_id: Uuid) -> BookingResult<Option<Reservation>> {
    Ok(
      self
        .state
        .read()
        .reservations
        .values()
        .find(|r| r.order_id == order_id)
        .cloned(),
    )
  }
}

fn in_range(when: DateTime<Utc>, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
  when >= from && when <= to
}

#[async_trait]
impl AppointmentStore for MemoryStore {
  async fn insert(&self, appointment: NewAppointment) -> BookingResult<Appointment> {
    let stored = Appointment {
      id: Uuid::new_v4(),
      customer_id: appointment.customer_id,
      date_time: appointment.date_time,
      hospital_name: appointment.hospital_name.trim().to_string(),
      status: AppointmentStatus::Pending,
      reminder_sent: false,
      follow_up_sent: false,
      created_at: Utc::now(),
    };
    self.state.write().appointments.insert(stored.id, stored.clone());
    Ok(stored)
  }

  async fn get(&self, appointment_id: Uuid) -> BookingResult<Option<Appointment>> {
    Ok(self.state.read().appointments.get(&appointment_id).cloned())
  }

  async fn update_status(
    &self,
    appointment_id: Uuid,
    expected: AppointmentStatus,
    next: AppointmentStatus,
  ) -> BookingResult<Option<Appointment>> {
    let mut state = self.state.write();
    match state.appointments.get_mut(&appointment_id) {
      Some(appointment) if appointment.status == expected => {
        appointment.status = next;
        Ok(Some(appointment.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn due_for_reminder(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Vec<Appointment>> {
    Ok(
      self
        .state
        .read()
        .appointments
        .values()
        .filter(|a| a.status == AppointmentStatus::Confirmed && !a.reminder_sent)
        .filter(|a| in_range(a.date_time, from, to))
        .cloned()
        .collect(),
    )
  }

  async fn due_for_follow_up(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BookingResult<Vec<Appointment>> {
    Ok(
      self
        .state
        .read()
        .appointments
        .values()
        .filter(|a| a.status == AppointmentStatus::Completed && !a.follow_up_sent)
        .filter(|a| in_range(a.date_time, from, to))
        .cloned()
        .collect(),
    )
  }

  async fn claim_reminder(&self, appointment_id: Uuid) -> BookingResult<bool> {
    let mut state = self.state.write();
    match state.appointments.get_mut(&appointment_id) {
      Some(appointment) if !appointment.reminder_sent => {
        appointment.reminder_sent = true;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn release_reminder(&self, appointment_id: Uuid) -> BookingResult<()> {
    if let Some(appointment) = self.state.write().appointments.get_mut(&appointment_id) {
      appointment.reminder_sent = false;
    }
    Ok(())
  }

  async fn claim_follow_up(&self, appointment_id: Uuid) -> BookingResult<bool> {
    let mut state = self.state.write();
    match state.appointments.get_mut(&appointment_id) {
      Some(appointment) if !appointment.follow_up_sent => {
        appointment.follow_up_sent = true;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn release_follow_up(&self, appointment_id: Uuid) -> BookingResult<()> {
    if let Some(appointment) = self.state.write().appointments.get_mut(&appointment_id) {
      appointment.follow_up_sent = false;
    }
    Ok(())
  }
}

#[async_trait]
impl ServiceCatalog for MemoryStore {
  async fn get_service(&self, service_id: Uuid) -> BookingResult<Option<Service>> {
    Ok(self.state.read().services.get(&service_id).cloned())
  }
}

#[async_trait]
impl CustomerDirectory for MemoryStore {
  async fn get_customer(&self, customer_id: Uuid) -> BookingResult<Option<Customer>> {
    Ok(self.state.read().customers.get(&customer_id).cloned())
  }
}
