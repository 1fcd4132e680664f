// server/src/lib.rs

//! HTTP application around the `bookwell` core: PostgreSQL stores, provider
//! clients, REST handlers and background jobs.

pub mod config;
pub mod db;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
