// server/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use bookwell::domain::{Customer, Service, ServiceType};
use bookwell::ports::{
  CheckoutRequest, CheckoutSession, PaymentGateway, ProviderStatus, ProviderVerification, SmsReceipt, SmsSender,
};
use bookwell::store::MemoryStore;
use bookwell::{
  offset_from_minutes, BookingError, BookingResult, DispatchMode, NotifierConfig, ReminderConfig, ReminderWindow,
  WorkflowConfig,
};
use bookwell_app::state::AppState;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

#[derive(Default)]
pub struct RecordingSms {
  pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsSender for RecordingSms {
  async fn send_sms(&self, phone: &str, message: &str) -> BookingResult<SmsReceipt> {
    self.sent.lock().push((phone.to_string(), message.to_string()));
    Ok(SmsReceipt {
      provider_message_id: None,
    })
  }
}

#[derive(Default)]
pub struct FakeGateway {
  pub fail_initiate: AtomicBool,
  pub initiate_calls: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
  async fn initiate_external_payment(&self, request: &CheckoutRequest) -> BookingResult<CheckoutSession> {
    self.initiate_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_initiate.load(Ordering::SeqCst) {
      return Err(BookingError::external("santimpay", "HTTP 503: unavailable"));
    }
    Ok(CheckoutSession {
      redirect_url: format!("https://checkout.test/pay/{}", request.reference),
      provider_reference: None,
    })
  }

  async fn verify_external_payment(&self, reference: &str) -> BookingResult<ProviderVerification> {
    Ok(ProviderVerification {
      status: ProviderStatus::Completed,
      provider_transaction_id: Some(format!("txn-{}", reference)),
      amount: None,
      raw: json!({ "thirdPartyId": reference, "Status": "COMPLETED" }),
    })
  }
}

pub struct TestApp {
  pub store: MemoryStore,
  pub sms: Arc<RecordingSms>,
  pub gateway: Arc<FakeGateway>,
  pub state: AppState,
  pub customer: Customer,
  pub hall: Service,
  pub rooms: Service,
}

impl TestApp {
  pub fn new() -> Self {
    let store = MemoryStore::new();
    let customer = store.insert_customer("Selam", "0911223344");
    let hall = store.insert_service("Sunrise Hall", ServiceType::Fixed, dec!(500));
    let rooms = store.insert_service("Guest Rooms", ServiceType::PerDate, dec!(120));
    let sms = Arc::new(RecordingSms::default());
    let gateway = Arc::new(FakeGateway::default());
    let state = AppState::new(
      store.clone().into_stores(),
      gateway.clone(),
      sms.clone(),
      NotifierConfig {
        country_code: "251".to_string(),
        display_offset: offset_from_minutes(180),
        mode: DispatchMode::Inline,
      },
      WorkflowConfig::from_base_urls("https://app.test", "https://api.test", "santimpay"),
      ReminderConfig {
        window: ReminderWindow::Within(chrono::Duration::hours(24)),
        local_offset: offset_from_minutes(180),
      },
      ReminderConfig {
        window: ReminderWindow::DaysAhead(3),
        local_offset: offset_from_minutes(180),
      },
    );
    Self {
      store,
      sms,
      gateway,
      state,
      customer,
      hall,
      rooms,
    }
  }
}

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
