mod access;
mod distribution;
pub mod forecast;

pub use access::AccessTier;
pub use distribution::{Distribution, YearStatistics};
pub use forecast::{
    decode_revenues, encode_revenues, BatteryChemistry, CreateForecast, ForecastFilter,
    ForecastMetadata, ForecastRecord, Location, NewForecast, UseCase,
};
