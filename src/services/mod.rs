pub mod csv_export_service;
pub mod distribution_service;
pub mod forecast_parser;
pub mod forecast_service;
