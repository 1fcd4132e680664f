// server/src/models/catalog.rs

use bookwell::domain::{Customer, Service};
use bookwell::BookingError;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;

#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
  pub id: Uuid,
  pub name: String,
  pub service_type: String,
  pub cost_per_date: Option<Decimal>,
  pub cost_per_service: Option<Decimal>,
}

impl TryFrom<ServiceRow> for Service {
  type Error = BookingError;

  fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
    Ok(Service {
      id: row.id,
      name: row.name,
      service_type: parse_column(&row.service_type)?,
      cost_per_date: row.cost_per_date,
      cost_per_service: row.cost_per_service,
    })
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
  pub id: Uuid,
  pub name: String,
  pub phone: String,
}

impl From<CustomerRow> for Customer {
  fn from(row: CustomerRow) -> Self {
    Customer {
      id: row.id,
      name: row.name,
      phone: row.phone,
    }
  }
}
