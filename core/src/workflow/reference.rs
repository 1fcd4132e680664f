// core/src/workflow/reference.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// `PAY-<yyyymmddHHMMSSmmm>-<12 random hex>`. A new one is generated for every
/// initiation attempt; references are never reused.
pub fn generate_reference(now: DateTime<Utc>) -> String {
  let random = Uuid::new_v4().simple().to_string();
  format!("PAY-{}-{}", now.format("%Y%m%d%H%M%S%3f"), &random[..12])
}
