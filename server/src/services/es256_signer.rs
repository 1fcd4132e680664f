// server/src/services/es256_signer.rs

use bookwell::ports::TokenSigner;
use bookwell::{BookingError, BookingResult};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value as JsonValue;

/// Signs gateway tokens with the merchant's P-256 private key.
pub struct Es256Signer {
  key: EncodingKey,
}

impl Es256Signer {
  /// Fails with `Configuration` when the PEM is missing or not an EC key.
  pub fn from_pem(pem: &str) -> BookingResult<Self> {
    if pem.trim().is_empty() {
      return Err(BookingError::Configuration("Gateway private key is empty".to_string()));
    }
    let key = EncodingKey::from_ec_pem(pem.as_bytes())
      .map_err(|e| BookingError::Configuration(format!("Invalid gateway private key: {}", e)))?;
    Ok(Self { key })
  }
}

impl TokenSigner for Es256Signer {
  fn sign(&self, claims: &JsonValue) -> BookingResult<String> {
    encode(&Header::new(Algorithm::ES256), claims, &self.key)
      .map_err(|e| BookingError::Configuration(format!("Cannot sign gateway token: {}", e)))
  }
}
