use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{Distribution, ForecastRecord, YearStatistics};

/// Pairs each revenue with its absolute calendar year (`start_year + index`).
/// Stops early if the year would overflow.
pub fn calendar_year_observations(
    start_year: i32,
    revenues: &[f64],
) -> impl Iterator<Item = (i32, f64)> + '_ {
    revenues.iter().enumerate().map_while(move |(offset, &revenue)| {
        let year = i32::try_from(offset)
            .ok()
            .and_then(|offset| start_year.checked_add(offset));
        if year.is_none() {
            warn!(
                "Dropping revenues beyond calendar year range (start year {}, offset {})",
                start_year, offset
            );
        }
        year.map(|year| (year, revenue))
    })
}

/// Aligns every `(start_year, revenues)` series onto calendar years and computes the
/// per-year statistics. Output does not depend on the order of the input series.
pub fn aggregate<'a, I>(series: I) -> Distribution
where
    I: IntoIterator<Item = (i32, &'a [f64])>,
{
    let mut forecast_count = 0;
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();

    for (start_year, revenues) in series {
        forecast_count += 1;
        for (year, revenue) in calendar_year_observations(start_year, revenues) {
            by_year.entry(year).or_default().push(revenue);
        }
    }

    let years = by_year
        .into_iter()
        .filter_map(|(year, values)| year_statistics(values).map(|stats| (year, stats)))
        .collect();

    Distribution {
        forecast_count,
        years,
    }
}

pub fn distribution(records: &[ForecastRecord]) -> Distribution {
    aggregate(
        records
            .iter()
            .map(|record| (record.start_year, record.revenues.as_slice())),
    )
}

/// Statistics for one year's bag of observations. `None` for an empty bag.
pub fn year_statistics(mut values: Vec<f64>) -> Option<YearStatistics> {
    if values.is_empty() {
        return None;
    }

    // Sorting first makes every sum below independent of submission order.
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(YearStatistics {
        count: values.len(),
        mean,
        median: percentile(&values, 0.5),
        std: variance.sqrt(),
        p25: percentile(&values, 0.25),
        p75: percentile(&values, 0.75),
        min: values[0],
        max: values[values.len() - 1],
        raw_values: values,
    })
}

/// Linear interpolation between the closest ranks of an ascending slice.
/// `q` is a fraction in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let position = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let weight = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_series() {
        let revenues = [10.0, 20.0, 30.0];
        let dist = aggregate([(2025, &revenues[..])]);

        assert_eq!(dist.forecast_count, 1);
        assert_eq!(dist.years.keys().copied().collect::<Vec<_>>(), vec![2025, 2026, 2027]);
        for (year, expected) in [(2025, 10.0), (2026, 20.0), (2027, 30.0)] {
            let stats = dist.get(year).unwrap();
            assert_eq!(stats.count, 1);
            assert_eq!(stats.mean, expected);
            assert_eq!(stats.median, expected);
            assert_eq!(stats.std, 0.0);
            assert_eq!(stats.p25, expected);
            assert_eq!(stats.p75, expected);
            assert_eq!(stats.raw_values, vec![expected]);
        }
    }

    #[test]
    fn test_overlapping_series_align_on_calendar_years() {
        let a = [10.0, 20.0];
        let b = [40.0, 60.0];
        let dist = aggregate([(2025, &a[..]), (2026, &b[..])]);

        assert_eq!(dist.get(2025).unwrap().raw_values, vec![10.0]);

        let overlap = dist.get(2026).unwrap();
        assert_eq!(overlap.raw_values, vec![20.0, 40.0]);
        assert_eq!(overlap.mean, 30.0);
        assert_eq!(overlap.median, 30.0);
        assert_eq!(overlap.std, 10.0);

        assert_eq!(dist.get(2027).unwrap().raw_values, vec![60.0]);
        assert_eq!(dist.year_range(), Some((2025, 2027)));
    }

    #[test]
    fn test_gaps_between_series_stay_absent() {
        let a = [1.0];
        let b = [2.0];
        let dist = aggregate([(2025, &a[..]), (2030, &b[..])]);
        assert_eq!(dist.years.len(), 2);
        assert!(dist.get(2027).is_none());
    }

    #[test]
    fn test_empty_input_gives_empty_distribution() {
        let dist = aggregate(std::iter::empty::<(i32, &[f64])>());
        assert!(dist.is_empty());
        assert_eq!(dist.forecast_count, 0);
        assert_eq!(dist.year_range(), None);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let series: Vec<(i32, Vec<f64>)> = vec![
            (2024, vec![0.1, 0.7, 1e6, -3.3]),
            (2025, vec![0.2, 0.3, 123.456]),
            (2026, vec![-0.1, 99.99]),
            (2025, vec![7.0, 1e-3, 0.3, 0.3, 5.5]),
        ];
        let forward = aggregate(series.iter().map(|(y, r)| (*y, r.as_slice())));
        let backward = aggregate(series.iter().rev().map(|(y, r)| (*y, r.as_slice())));
        let shuffled = aggregate(
            [2, 0, 3, 1]
                .iter()
                .map(|&i| (series[i].0, series[i].1.as_slice())),
        );

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_quartiles_use_linear_interpolation() {
        let stats = year_statistics(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!(approx(stats.p25, 1.75));
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.p75, 3.25));
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!(approx(stats.std, 1.25_f64.sqrt()));
    }

    #[test]
    fn test_odd_count_median() {
        let stats = year_statistics(vec![5.0, -1.0, 3.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.p25, 1.0);
        assert_eq!(stats.p75, 4.0);
    }

    #[test]
    fn test_year_statistics_empty_bag() {
        assert!(year_statistics(Vec::new()).is_none());
    }

    #[test]
    fn test_overflowing_years_are_dropped() {
        let revenues = [1.0, 2.0, 3.0];
        let observed: Vec<_> = calendar_year_observations(i32::MAX - 1, &revenues).collect();
        assert_eq!(observed, vec![(i32::MAX - 1, 1.0), (i32::MAX, 2.0)]);
    }

    #[test]
    fn test_extreme_accepted_revenues_stay_finite() {
        use crate::services::forecast_parser::MAX_REVENUE_MAGNITUDE;

        let mut values = vec![MAX_REVENUE_MAGNITUDE; 5_000];
        values.extend(vec![-MAX_REVENUE_MAGNITUDE; 5_000]);
        let stats = year_statistics(values).unwrap();
        for value in [stats.mean, stats.median, stats.std, stats.p25, stats.p75] {
            assert!(value.is_finite(), "{value}");
        }
        assert!(approx(stats.std / MAX_REVENUE_MAGNITUDE, 1.0));
    }
}
