pub(crate) mod access;
pub(crate) mod forecasts;
pub(crate) mod health;

pub use access::PREMIUM_HEADER;
