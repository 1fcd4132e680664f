// server/src/db/catalog.rs

use async_trait::async_trait;
use bookwell::domain::{Customer, Service};
use bookwell::ports::{CustomerDirectory, ServiceCatalog};
use bookwell::BookingResult;
use uuid::Uuid;

use super::{db_err, PgStore};
use crate::models::{CustomerRow, ServiceRow};

#[async_trait]
impl ServiceCatalog for PgStore {
  async fn get_service(&self, service_id: Uuid) -> BookingResult<Option<Service>> {
    let row: Option<ServiceRow> = sqlx::query_as(
      "SELECT id, name, service_type, cost_per_date, cost_per_service FROM services WHERE id = $1",
    )
    .bind(service_id)
    .fetch_optional(self.pool())
    .await
    .map_err(db_err)?;
    row.map(Service::try_from).transpose()
  }
}

#[async_trait]
impl CustomerDirectory for PgStore {
  async fn get_customer(&self, customer_id: Uuid) -> BookingResult<Option<Customer>> {
    let row: Option<CustomerRow> = sqlx::query_as("SELECT id, name, phone FROM customers WHERE id = $1")
      .bind(customer_id)
      .fetch_optional(self.pool())
      .await
      .map_err(db_err)?;
    Ok(row.map(Customer::from))
  }
}
