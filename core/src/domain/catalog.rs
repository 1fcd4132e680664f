// core/src/domain/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::BookingError;

/// Decides which reservation shape a paid order produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
  #[serde(rename = "perDate")]
  PerDate,
  #[serde(rename = "fixed")]
  Fixed,
}

impl ServiceType {
  pub fn as_str(self) -> &'static str {
    match self {
      ServiceType::PerDate => "perDate",
      ServiceType::Fixed => "fixed",
    }
  }
}

impl FromStr for ServiceType {
  type Err = BookingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "perDate" => Ok(ServiceType::PerDate),
      "fixed" => Ok(ServiceType::Fixed),
      other => Err(BookingError::Validation(format!("Unknown service type '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
  pub id: Uuid,
  pub name: String,
  pub service_type: ServiceType,
  pub cost_per_date: Option<Decimal>,
  pub cost_per_service: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub id: Uuid,
  pub name: String,
  pub phone: String,
}
