use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// Metadata Enums
// ==============================================================================

/// Market zone the storage system is connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "North Germany")]
    NorthGermany,
    #[serde(rename = "South Germany")]
    SouthGermany,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::NorthGermany => "North Germany",
            Location::SouthGermany => "South Germany",
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "North Germany" => Ok(Location::NorthGermany),
            "South Germany" => Ok(Location::SouthGermany),
            other => Err(format!("Unknown location: {}", other)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatteryChemistry {
    #[serde(rename = "LFP")]
    Lfp,
    #[serde(rename = "NMC")]
    Nmc,
    Other,
}

impl BatteryChemistry {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatteryChemistry::Lfp => "LFP",
            BatteryChemistry::Nmc => "NMC",
            BatteryChemistry::Other => "Other",
        }
    }
}

impl FromStr for BatteryChemistry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LFP" => Ok(BatteryChemistry::Lfp),
            "NMC" => Ok(BatteryChemistry::Nmc),
            "Other" => Ok(BatteryChemistry::Other),
            other => Err(format!("Unknown battery chemistry: {}", other)),
        }
    }
}

impl fmt::Display for BatteryChemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Revenue stack the forecast assumes the asset is marketed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseCase {
    #[serde(rename = "FCR")]
    Fcr,
    #[serde(rename = "aFRR")]
    Afrr,
    #[serde(rename = "Wholesale Trading")]
    WholesaleTrading,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::Fcr => "FCR",
            UseCase::Afrr => "aFRR",
            UseCase::WholesaleTrading => "Wholesale Trading",
        }
    }
}

impl FromStr for UseCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "FCR" => Ok(UseCase::Fcr),
            "aFRR" => Ok(UseCase::Afrr),
            "Wholesale Trading" => Ok(UseCase::WholesaleTrading),
            other => Err(format!("Unknown use case: {}", other)),
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==============================================================================
// Forecast Records
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    /// Installed capacity in MWh.
    pub system_size: f64,
    pub location: Location,
    pub battery_chemistry: BatteryChemistry,
    pub use_case: UseCase,
    pub premium: bool,
}

/// One submitted revenue forecast. `revenues[i]` belongs to calendar year `start_year + i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: Uuid,
    pub start_year: i32,
    pub revenues: Vec<f64>,
    #[serde(flatten)]
    pub metadata: ForecastMetadata,
    pub submitted_at: DateTime<Utc>,
}

impl ForecastRecord {
    pub(crate) fn new(forecast: NewForecast) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_year: forecast.start_year,
            revenues: forecast.revenues,
            metadata: forecast.metadata,
            submitted_at: Utc::now(),
        }
    }

    /// Last calendar year covered, assuming consecutive years.
    pub fn end_year(&self) -> i32 {
        let span = i32::try_from(self.revenues.len().saturating_sub(1)).unwrap_or(i32::MAX);
        self.start_year.saturating_add(span)
    }
}

/// A validated forecast ready to be appended to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewForecast {
    pub start_year: i32,
    pub revenues: Vec<f64>,
    pub metadata: ForecastMetadata,
}

/// Submission payload. `premium` is deliberately absent; it comes from the access tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateForecast {
    pub pasted_data: String,
    pub system_size: f64,
    pub location: Location,
    pub battery_chemistry: BatteryChemistry,
    pub use_case: UseCase,
}

// ==============================================================================
// Filters
// ==============================================================================

/// Exact-match metadata filter plus an inclusive system size range.
/// Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub battery_chemistry: Option<BatteryChemistry>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub use_case: Option<UseCase>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub premium: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_system_size: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_system_size: Option<f64>,
}

impl ForecastFilter {
    pub fn is_empty(&self) -> bool {
        *self == ForecastFilter::default()
    }

    pub fn matches(&self, record: &ForecastRecord) -> bool {
        let meta = &record.metadata;
        self.location.map_or(true, |l| meta.location == l)
            && self.battery_chemistry.map_or(true, |c| meta.battery_chemistry == c)
            && self.use_case.map_or(true, |u| meta.use_case == u)
            && self.premium.map_or(true, |p| meta.premium == p)
            && self.min_system_size.map_or(true, |min| meta.system_size >= min)
            && self.max_system_size.map_or(true, |max| meta.system_size <= max)
    }
}

/// Query strings send `location=` for "any"; treat blank values as unset.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => T::from_str(s).map(Some).map_err(de::Error::custom),
    }
}

// ==============================================================================
// Revenue Serialization
// ==============================================================================

/// Stored form of a revenue series: comma-joined decimals.
pub fn encode_revenues(revenues: &[f64]) -> String {
    revenues
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_revenues(encoded: &str) -> Result<Vec<f64>, String> {
    if encoded.trim().is_empty() {
        return Err("Empty revenue series".to_string());
    }

    encoded
        .split(',')
        .map(|part| {
            let value = part
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("Invalid stored revenue '{}': {}", part, e))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("Non-finite stored revenue '{}'", part))
            }
        })
        .collect()
}
