// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use bookwell::domain::{Customer, NewOrder, Order, ServiceType};
use bookwell::ports::{
  CheckoutRequest, CheckoutSession, PaymentGateway, ProviderStatus, ProviderVerification, SmsReceipt, SmsSender,
};
use bookwell::store::MemoryStore;
use bookwell::{
  offset_from_minutes, BookingError, BookingResult, DispatchMode, NotificationDispatcher, NotifierConfig,
  PaymentWorkflow, Stores, WorkflowConfig,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::{
  atomic::{AtomicBool, AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- SMS double ---

#[derive(Default)]
pub struct RecordingSms {
  sent: Mutex<Vec<(String, String)>>,
  failing: AtomicBool,
}

impl RecordingSms {
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  /// `(phone, message)` pairs in send order.
  pub fn sent(&self) -> Vec<(String, String)> {
    self.sent.lock().clone()
  }

  pub fn count_containing(&self, needle: &str) -> usize {
    self.sent.lock().iter().filter(|(_, msg)| msg.contains(needle)).count()
  }
}

#[async_trait]
impl SmsSender for RecordingSms {
  async fn send_sms(&self, phone: &str, message: &str) -> BookingResult<SmsReceipt> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(BookingError::external("sms", "provider unavailable"));
    }
    let mut sent = self.sent.lock();
    sent.push((phone.to_string(), message.to_string()));
    Ok(SmsReceipt {
      provider_message_id: Some(format!("msg-{}", sent.len())),
    })
  }
}

/// Holds every send until [`open`](Self::open) is called, then records it.
pub struct GatedSms {
  gate: tokio::sync::Semaphore,
  pub started: AtomicUsize,
  pub inner: RecordingSms,
}

impl Default for GatedSms {
  fn default() -> Self {
    Self {
      gate: tokio::sync::Semaphore::new(0),
      started: AtomicUsize::new(0),
      inner: RecordingSms::default(),
    }
  }
}

impl GatedSms {
  pub fn open(&self) {
    self.gate.add_permits(1);
  }

  /// Polls until `count` messages are recorded or two seconds pass.
  pub async fn wait_for(&self, count: usize) -> bool {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
      if self.inner.sent().len() >= count {
        return true;
      }
      tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    self.inner.sent().len() >= count
  }
}

#[async_trait]
impl SmsSender for GatedSms {
  async fn send_sms(&self, phone: &str, message: &str) -> BookingResult<SmsReceipt> {
    self.started.fetch_add(1, Ordering::SeqCst);
    let _permit = self
      .gate
      .acquire()
      .await
      .map_err(|_| BookingError::external("sms", "gate closed"))?;
    self.inner.send_sms(phone, message).await
  }
}

// --- Gateway double ---

pub struct ScriptedGateway {
  pub fail_initiate: AtomicBool,
  pub initiate_calls: AtomicUsize,
  pub verify_calls: AtomicUsize,
  pub last_request: Mutex<Option<CheckoutRequest>>,
  pub verify_status: Mutex<ProviderStatus>,
}

impl Default for ScriptedGateway {
  fn default() -> Self {
    Self {
      fail_initiate: AtomicBool::new(false),
      initiate_calls: AtomicUsize::new(0),
      verify_calls: AtomicUsize::new(0),
      last_request: Mutex::new(None),
      verify_status: Mutex::new(ProviderStatus::Pending),
    }
  }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
  async fn initiate_external_payment(&self, request: &CheckoutRequest) -> BookingResult<CheckoutSession> {
    self.initiate_calls.fetch_add(1, Ordering::SeqCst);
    *self.last_request.lock() = Some(request.clone());
    if self.fail_initiate.load(Ordering::SeqCst) {
      return Err(BookingError::external("santimpay", "gateway returned 503"));
    }
    Ok(CheckoutSession {
      redirect_url: format!("https://checkout.test/pay/{}", request.reference),
      provider_reference: Some(format!("prov-{}", request.reference)),
    })
  }

  async fn verify_external_payment(&self, reference: &str) -> BookingResult<ProviderVerification> {
    self.verify_calls.fetch_add(1, Ordering::SeqCst);
    Ok(ProviderVerification {
      status: *self.verify_status.lock(),
      provider_transaction_id: Some(format!("txn-{}", reference)),
      amount: None,
      raw: json!({ "thirdPartyId": reference }),
    })
  }
}

// --- Fixtures ---

pub const CUSTOMER_PHONE: &str = "0911223344";
pub const NORMALIZED_PHONE: &str = "251911223344";

pub fn notifier_config() -> NotifierConfig {
  NotifierConfig {
    country_code: "251".to_string(),
    display_offset: offset_from_minutes(180),
    mode: DispatchMode::Inline,
  }
}

pub fn workflow_config() -> WorkflowConfig {
  WorkflowConfig::from_base_urls("https://app.test", "https://api.test", "santimpay")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub struct Harness {
  pub store: MemoryStore,
  pub stores: Stores,
  pub sms: Arc<RecordingSms>,
  pub gateway: Arc<ScriptedGateway>,
  pub notifier: NotificationDispatcher,
  pub workflow: PaymentWorkflow,
  pub customer: Customer,
}

impl Harness {
  pub fn new() -> Self {
    let store = MemoryStore::new();
    let customer = store.insert_customer("Abebe", CUSTOMER_PHONE);
    let stores = store.clone().into_stores();
    let sms = Arc::new(RecordingSms::default());
    let gateway = Arc::new(ScriptedGateway::default());
    let notifier = NotificationDispatcher::new(sms.clone(), notifier_config());
    let workflow = PaymentWorkflow::new(stores.clone(), gateway.clone(), notifier.clone(), workflow_config());
    Self {
      store,
      stores,
      sms,
      gateway,
      notifier,
      workflow,
      customer,
    }
  }

  /// A pending order for a fresh service of the given type.
  pub async fn order(&self, service_type: ServiceType, date: Option<NaiveDate>, date_count: Option<i32>) -> Order {
    let service = self.store.insert_service("Sunrise Hall", service_type, dec!(500));
    self
      .stores
      .orders
      .insert(NewOrder {
        customer_id: self.customer.id,
        service_id: service.id,
        package_id: None,
        description: None,
        attached_file_path: None,
        date,
        date_count,
      })
      .await
      .expect("order insert")
  }
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
