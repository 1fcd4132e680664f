// core/src/notify/phone.rs

use crate::error::{BookingError, BookingResult};

fn format_error(raw: &str, reason: &str) -> BookingError {
  BookingError::PhoneFormat {
    phone: raw.to_string(),
    reason: reason.to_string(),
  }
}

/// Normalizes a phone number to `<country_code><subscriber>` without a `+`.
///
/// Accepted inputs:
/// - `0` followed by the subscriber number (national form): the `0` is replaced by the country code.
/// - the bare subscriber number starting with `9` or `7`: the country code is prefixed.
/// - an already prefixed number, with or without a leading `+`: passed through.
///
/// The subscriber part must start with `9` or `7` and be 8 or 9 digits long.
pub fn normalize_phone(raw: &str, country_code: &str) -> BookingResult<String> {
  let trimmed = raw.trim();
  let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

  if digits.is_empty() {
    return Err(format_error(raw, "phone number is empty"));
  }
  if !digits.chars().all(|c| c.is_ascii_digit()) {
    return Err(format_error(raw, "phone number must contain only digits"));
  }

  let normalized = if digits.starts_with(country_code) {
    digits.to_string()
  } else if let Some(national) = digits.strip_prefix('0') {
    format!("{}{}", country_code, national)
  } else if digits.starts_with('9') || digits.starts_with('7') {
    format!("{}{}", country_code, digits)
  } else {
    return Err(format_error(
      raw,
      &format!("must start with 0, 9, 7 or {}", country_code),
    ));
  };

  let subscriber = &normalized[country_code.len()..];
  let valid_prefix = subscriber.starts_with('9') || subscriber.starts_with('7');
  if !valid_prefix || !(8..=9).contains(&subscriber.len()) {
    return Err(format_error(
      raw,
      &format!("expected {}[9|7] followed by 7 or 8 digits", country_code),
    ));
  }
  Ok(normalized)
}

/// Masks every digit except the last four, for logs.
pub fn mask_phone(phone: &str) -> String {
  let total = phone.chars().count();
  phone
    .chars()
    .enumerate()
    .map(|(idx, c)| if c.is_ascii_digit() && idx + 4 < total { '*' } else { c })
    .collect()
}
