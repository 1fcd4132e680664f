// server/src/services/mod.rs

//! Outbound adapters behind the core's provider ports.

pub mod es256_signer;
pub mod geez_sms;
pub mod santimpay_client;

pub use es256_signer::Es256Signer;
pub use geez_sms::GeezSmsSender;
pub use santimpay_client::SantimPayHttp;

use bookwell::BookingError;
use std::time::Duration;

/// Shared outbound client; every provider call is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, BookingError> {
  reqwest::Client::builder()
    .connect_timeout(timeout.min(Duration::from_secs(5)))
    .timeout(timeout)
    .build()
    .map_err(|e| BookingError::Configuration(format!("Cannot build HTTP client: {}", e)))
}
