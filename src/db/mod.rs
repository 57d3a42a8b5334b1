pub mod forecast_queries;
