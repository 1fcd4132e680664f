// core/src/notify/dispatcher.rs

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::phone::{mask_phone, normalize_phone};
use super::templates::{render, NotificationEvent, TemplateContext};
use crate::config::{DispatchMode, NotifierConfig};
use crate::error::{BookingResult, IgnoreFailure};
use crate::ports::{SmsReceipt, SmsSender};

/// Formats and sends templated SMS messages.
///
/// Cloning is cheap; clones share the sender and configuration.
#[derive(Clone)]
pub struct NotificationDispatcher {
  sender: Arc<dyn SmsSender>,
  config: Arc<NotifierConfig>,
}

impl NotificationDispatcher {
  pub fn new(sender: Arc<dyn SmsSender>, config: NotifierConfig) -> Self {
    Self {
      sender,
      config: Arc::new(config),
    }
  }

  pub fn config(&self) -> &NotifierConfig {
    &self.config
  }

  /// Normalizes the recipient, renders the template for `event` and sends it.
  ///
  /// Errors: `PhoneFormat` for an unusable number, `Validation` when the
  /// context lacks a field the template needs, and whatever the SMS sender
  /// reports. No retries happen here.
  #[instrument(
    name = "NotificationDispatcher::notify",
    skip(self, recipient_phone, context),
    fields(event = event.as_str(), phone = %mask_phone(recipient_phone)),
    err(Display)
  )]
  pub async fn notify(
    &self,
    event: NotificationEvent,
    recipient_phone: &str,
    context: &TemplateContext,
  ) -> BookingResult<SmsReceipt> {
    let phone = normalize_phone(recipient_phone, &self.config.country_code)?;
    let message = render(event, context, self.config.display_offset)?;
    debug!(message_len = message.len(), "Sending notification.");

    let receipt = self.sender.send_sms(&phone, &message).await?;
    info!(provider_message_id = ?receipt.provider_message_id, "Notification sent.");
    Ok(receipt)
  }

  /// Sends a notification whose outcome must not affect the caller.
  ///
  /// In `Detached` mode the send runs on its own task and this returns
  /// immediately; in `Inline` mode it is awaited. Either way a failure is
  /// logged and discarded.
  pub async fn notify_best_effort(&self, event: NotificationEvent, recipient_phone: String, context: TemplateContext) {
    let runtime = match self.config.mode {
      DispatchMode::Detached => tokio::runtime::Handle::try_current().ok(),
      DispatchMode::Inline => None,
    };

    match runtime {
      Some(handle) => {
        let dispatcher = self.clone();
        handle.spawn(async move {
          dispatcher
            .notify(event, &recipient_phone, &context)
            .await
            .ignore_failure(event.as_str());
        });
      }
      None => self
        .notify(event, &recipient_phone, &context)
        .await
        .ignore_failure(event.as_str()),
    }
  }
}
