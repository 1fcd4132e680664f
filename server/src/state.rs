// server/src/state.rs

use bookwell::ports::{PaymentGateway, SmsSender};
use bookwell::{
  AppointmentService, NotificationDispatcher, NotifierConfig, PaymentWorkflow, ReminderConfig, ReminderScheduler,
  Stores, WorkflowConfig,
};
use std::sync::Arc;

/// Services shared by handlers and background jobs. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
  pub stores: Stores,
  pub workflow: PaymentWorkflow,
  pub appointments: AppointmentService,
  /// Scan over the next few hours.
  pub reminders: Arc<ReminderScheduler>,
  /// Scan over one whole local day a fixed number of days out.
  pub day_ahead_reminders: Arc<ReminderScheduler>,
  /// Provider name accepted on the webhook route.
  pub payment_option: String,
}

impl AppState {
  pub fn new(
    stores: Stores,
    gateway: Arc<dyn PaymentGateway>,
    sms: Arc<dyn SmsSender>,
    notifier_config: NotifierConfig,
    workflow_config: WorkflowConfig,
    reminder_config: ReminderConfig,
    day_ahead_config: ReminderConfig,
  ) -> Self {
    let notifier = NotificationDispatcher::new(sms, notifier_config);
    let payment_option = workflow_config.payment_option.clone();
    Self {
      workflow: PaymentWorkflow::new(stores.clone(), gateway, notifier.clone(), workflow_config),
      appointments: AppointmentService::new(stores.clone(), notifier.clone()),
      reminders: Arc::new(ReminderScheduler::new(stores.clone(), notifier.clone(), reminder_config)),
      day_ahead_reminders: Arc::new(ReminderScheduler::new(stores.clone(), notifier, day_ahead_config)),
      stores,
      payment_option,
    }
  }
}
