use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cross-sectional statistics for one calendar year across all forecasts covering it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub p25: f64,
    pub p75: f64,
    pub min: f64,
    pub max: f64,
    /// Every observation for the year, sorted ascending.
    pub raw_values: Vec<f64>,
}

/// Calendar year -> statistics. Years nobody forecast are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub forecast_count: usize,
    pub years: BTreeMap<i32, YearStatistics>,
}

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn get(&self, year: i32) -> Option<&YearStatistics> {
        self.years.get(&year)
    }

    /// First and last calendar year with at least one observation.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let first = *self.years.keys().next()?;
        let last = *self.years.keys().next_back()?;
        Some((first, last))
    }
}
