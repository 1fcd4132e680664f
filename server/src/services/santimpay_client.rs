// server/src/services/santimpay_client.rs

use async_trait::async_trait;
use bookwell::ports::GatewayTransport;
use bookwell::{BookingError, BookingResult};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument, warn};

const SERVICE: &str = "santimpay";

/// JSON-over-HTTPS transport for the SantimPay API.
#[derive(Clone)]
pub struct SantimPayHttp {
  client: reqwest::Client,
  base_url: String,
}

impl SantimPayHttp {
  pub fn new(client: reqwest::Client, base_url: &str) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  async fn read_json(response: reqwest::Response) -> BookingResult<JsonValue> {
    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| BookingError::external(SERVICE, format!("Failed reading response body: {}", e)))?;

    if !status.is_success() {
      warn!(http_status = %status, "Gateway returned non-success status.");
      return Err(BookingError::external(
        SERVICE,
        format!("HTTP {}: {}", status.as_u16(), body.chars().take(512).collect::<String>()),
      ));
    }

    serde_json::from_str(&body)
      .map_err(|e| BookingError::external(SERVICE, format!("Response was not valid JSON: {}", e)))
  }
}

#[async_trait]
impl GatewayTransport for SantimPayHttp {
  #[instrument(name = "SantimPayHttp::post_json", skip(self, body), err(Display))]
  async fn post_json(&self, path: &str, body: &JsonValue) -> BookingResult<JsonValue> {
    let url = self.url(path);
    debug!(%url, "Posting to gateway.");
    let response = self
      .client
      .post(&url)
      .json(body)
      .send()
      .await
      .map_err(|e| BookingError::external(SERVICE, format!("Request to {} failed: {}", path, e)))?;
    Self::read_json(response).await
  }

  #[instrument(name = "SantimPayHttp::get_json", skip(self, bearer_token), err(Display))]
  async fn get_json(&self, path: &str, bearer_token: &str) -> BookingResult<JsonValue> {
    let response = self
      .client
      .get(self.url(path))
      .bearer_auth(bearer_token)
      .send()
      .await
      .map_err(|e| BookingError::external(SERVICE, format!("Request to {} failed: {}", path, e)))?;
    Self::read_json(response).await
  }
}
