// server/src/db/mod.rs

//! PostgreSQL implementations of the core storage ports.
//!
//! Every idempotency-relevant write is a single conditional statement
//! (`UPDATE ... WHERE status = 'pending'`, `ON CONFLICT DO NOTHING`,
//! `UPDATE ... WHERE reminder_sent = FALSE`), so no explicit transactions or
//! row locks are held across calls.

mod appointments;
mod catalog;
mod orders;
mod payments;
mod reservations;

use bookwell::{BookingError, Stores};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  pub fn into_stores(self) -> Stores {
    let store = Arc::new(self);
    Stores {
      payments: store.clone(),
      orders: store.clone(),
      reservations: store.clone(),
      appointments: store.clone(),
      services: store.clone(),
      customers: store,
    }
  }
}

/// Connects the pool and applies pending migrations when enabled.
pub async fn connect(config: &AppConfig) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .connect(&config.database_url)
    .await?;
  tracing::info!("Successfully connected to the database.");

  if config.run_migrations {
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied.");
  }
  Ok(pool)
}

/// Unique violations become `Conflict`; everything else is a storage failure.
pub(crate) fn db_err(err: sqlx::Error) -> BookingError {
  let unique_violation = err
    .as_database_error()
    .is_some_and(|db| db.is_unique_violation());
  if unique_violation {
    BookingError::Conflict(err.to_string())
  } else {
    BookingError::storage(err)
  }
}
