//! Ingestion and aggregation backend for BESS revenue forecasts.
//!
//! Forecasters paste multi-year revenue series copied from a spreadsheet; the
//! service parses and stores them, then aligns the whole ensemble on calendar
//! years to serve per-year distribution statistics.

pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use errors::AppError;
