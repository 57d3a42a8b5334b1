//! Parsing of revenue forecasts pasted from a spreadsheet.
//!
//! Two layouts are accepted:
//! - row-major: first row holds the years, second row the revenues
//! - column-major: one `year<sep>revenue` pair per line
//!
//! Cells are separated by tabs (what spreadsheets put on the clipboard) or, when the
//! text contains no tab at all, by commas.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid format: paste at least two rows (years and revenues)")]
    TooFewRows,
    #[error("Invalid format: row {row} is neither a year row nor a year/revenue pair")]
    NotTabular { row: usize },
    #[error("Invalid year '{token}': years must be whole numbers")]
    InvalidYear { token: String },
    #[error("Mismatched years and revenues: {years} years but {revenues} revenue values")]
    LengthMismatch { years: usize, revenues: usize },
    #[error("Years in the first row must increase from left to right")]
    UnorderedYears,
    #[error("Revenue value '{token}' is not a number")]
    InvalidRevenue { token: String },
    #[error("Revenue value '{token}' is outside the accepted range")]
    RevenueOutOfRange { token: String },
}

/// Largest absolute revenue accepted. Keeps per-year sums of squares finite.
pub const MAX_REVENUE_MAGNITUDE: f64 = 1e15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Rows,
    Columns,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedForecast {
    pub start_year: i32,
    /// Years exactly as pasted. Only `start_year` is persisted.
    pub years: Vec<i32>,
    pub revenues: Vec<f64>,
    pub layout: Layout,
}

impl ParsedForecast {
    /// True when every year follows its predecessor by exactly one.
    pub fn is_contiguous(&self) -> bool {
        is_consecutive(&self.years)
    }
}

pub fn parse_pasted_forecast(text: &str) -> Result<ParsedForecast, ParseError> {
    let separator = if text.contains('\t') { '\t' } else { ',' };

    let rows: Vec<Vec<&str>> = text
        .lines()
        .map(|line| {
            line.split(separator)
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    if rows.len() < 2 {
        return Err(ParseError::TooFewRows);
    }

    let row_years = parse_year_row(&rows[0]);
    let column_years = parse_year_column(&rows);

    match (row_years, column_years) {
        (Ok(by_row), _) if is_increasing(&by_row) => from_rows(by_row, &rows[1]),
        (_, Some(by_column)) => from_columns(by_column, &rows),
        (Ok(_), None) => Err(ParseError::UnorderedYears),
        (Err(token), None) => {
            if rows.iter().all(|row| parse_year(row[0]).is_some()) {
                let row = rows.iter().position(|row| row.len() != 2).unwrap_or(0);
                Err(ParseError::NotTabular { row: row + 1 })
            } else {
                Err(ParseError::InvalidYear { token })
            }
        }
    }
}

fn from_rows(years: Vec<i32>, revenue_row: &[&str]) -> Result<ParsedForecast, ParseError> {
    if years.len() != revenue_row.len() {
        return Err(ParseError::LengthMismatch {
            years: years.len(),
            revenues: revenue_row.len(),
        });
    }

    let revenues = revenue_row
        .iter()
        .map(|token| parse_revenue(token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedForecast {
        start_year: years[0],
        years,
        revenues,
        layout: Layout::Rows,
    })
}

fn from_columns(years: Vec<i32>, rows: &[Vec<&str>]) -> Result<ParsedForecast, ParseError> {
    let revenues = rows
        .iter()
        .map(|row| parse_revenue(row[1]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedForecast {
        start_year: years[0],
        years,
        revenues,
        layout: Layout::Columns,
    })
}

/// Every cell of the row must be a year. Returns the first offending token otherwise.
fn parse_year_row(row: &[&str]) -> Result<Vec<i32>, String> {
    row.iter()
        .map(|cell| parse_year(cell).ok_or_else(|| cell.to_string()))
        .collect()
}

/// Column-major needs exactly two cells per row with a year in the first one.
fn parse_year_column(rows: &[Vec<&str>]) -> Option<Vec<i32>> {
    rows.iter()
        .map(|row| if row.len() == 2 { parse_year(row[0]) } else { None })
        .collect()
}

fn parse_year(cell: &str) -> Option<i32> {
    cell.trim().parse::<i32>().ok()
}

fn is_increasing(years: &[i32]) -> bool {
    years.windows(2).all(|pair| pair[0] < pair[1])
}

fn is_consecutive(years: &[i32]) -> bool {
    years
        .windows(2)
        .all(|pair| pair[1].checked_sub(pair[0]) == Some(1))
}

fn numeric_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"[^0-9.\-]").expect("static pattern is valid"))
}

fn exponent_marker() -> &'static Regex {
    static EXPONENT: OnceLock<Regex> = OnceLock::new();
    EXPONENT.get_or_init(|| Regex::new(r"[0-9.][eE][+\-]?[0-9]").expect("static pattern is valid"))
}

/// Strips currency symbols, thousands separators, whitespace and other stray
/// characters, keeping digits, sign and decimal point. `(1,234)` becomes `-1234`.
pub fn clean_numeric_token(token: &str) -> String {
    let trimmed = token.trim();
    let (negated, inner) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    // Spreadsheets sometimes export U+2212 instead of an ASCII minus.
    let normalized = inner.replace('\u{2212}', "-");
    let cleaned = numeric_noise().replace_all(&normalized, "").into_owned();

    if negated && !cleaned.is_empty() && !cleaned.starts_with('-') {
        format!("-{}", cleaned)
    } else {
        cleaned
    }
}

/// Plain numbers (including scientific notation such as `1.5e6`) are taken as is.
/// Anything else goes through [`clean_numeric_token`]. A decorated token carrying an
/// exponent is rejected since stripping would drop the `e`.
pub fn parse_revenue(token: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidRevenue {
        token: token.to_string(),
    };

    let value = match token.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            if exponent_marker().is_match(token) {
                return Err(invalid());
            }
            clean_numeric_token(token)
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(invalid)?
        }
    };

    if value.abs() > MAX_REVENUE_MAGNITUDE {
        return Err(ParseError::RevenueOutOfRange {
            token: token.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_row_tab_layout() {
        let parsed = parse_pasted_forecast("2025\t2026\t2027\n100\t200\t300").unwrap();
        assert_eq!(parsed.start_year, 2025);
        assert_eq!(parsed.years, vec![2025, 2026, 2027]);
        assert_eq!(parsed.revenues, vec![100.0, 200.0, 300.0]);
        assert_eq!(parsed.layout, Layout::Rows);
        assert!(parsed.is_contiguous());
    }

    #[test]
    fn test_currency_and_thousands_separators() {
        let parsed =
            parse_pasted_forecast("2025\t2026\t2027\n€1,250,000\t$ 980,500.50\t-12,000 EUR")
                .unwrap();
        assert_eq!(parsed.revenues, vec![1_250_000.0, 980_500.5, -12_000.0]);
    }

    #[test]
    fn test_comma_separated_rows() {
        let parsed = parse_pasted_forecast("2030,2031\n55.5,-10").unwrap();
        assert_eq!(parsed.start_year, 2030);
        assert_eq!(parsed.revenues, vec![55.5, -10.0]);
    }

    #[test]
    fn test_column_layout() {
        let parsed = parse_pasted_forecast("2025\t€100\n2026\t€200\n2027\t€300\n").unwrap();
        assert_eq!(parsed.layout, Layout::Columns);
        assert_eq!(parsed.start_year, 2025);
        assert_eq!(parsed.revenues, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_increasing_first_row_reads_as_rows() {
        let parsed = parse_pasted_forecast("2025\t2026\n5000\t6000").unwrap();
        assert_eq!(parsed.layout, Layout::Rows);
        assert_eq!(parsed.revenues, vec![5000.0, 6000.0]);

        let parsed = parse_pasted_forecast("2025\t2030\n2026\t500").unwrap();
        assert_eq!(parsed.layout, Layout::Rows);
        assert_eq!(parsed.years, vec![2025, 2030]);
        assert_eq!(parsed.revenues, vec![2026.0, 500.0]);
        assert!(!parsed.is_contiguous());
    }

    #[test]
    fn test_column_layout_with_year_gap() {
        let parsed = parse_pasted_forecast("2025\t100\n2027\t200\n2028\t300").unwrap();
        assert_eq!(parsed.layout, Layout::Columns);
        assert_eq!(parsed.years, vec![2025, 2027, 2028]);
        assert_eq!(parsed.revenues, vec![100.0, 200.0, 300.0]);
        assert!(!parsed.is_contiguous());
    }

    #[test]
    fn test_decreasing_year_row_without_column_reading() {
        assert_eq!(
            parse_pasted_forecast("2027\t2026\t2025\n1\t2\t3"),
            Err(ParseError::UnorderedYears)
        );
    }

    #[test]
    fn test_windows_line_endings_and_trailing_tabs() {
        let parsed = parse_pasted_forecast("2025\t2026\t\r\n10\t20\t\r\n\r\n").unwrap();
        assert_eq!(parsed.revenues, vec![10.0, 20.0]);
    }

    #[test]
    fn test_extra_rows_are_ignored() {
        let parsed = parse_pasted_forecast("2025\t2026\t2027\n1\t2\t3\nnotes\there").unwrap();
        assert_eq!(parsed.revenues, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_single_row_is_rejected() {
        assert_eq!(
            parse_pasted_forecast("2025\t2026\t2027"),
            Err(ParseError::TooFewRows)
        );
        assert_eq!(parse_pasted_forecast("   \n\n"), Err(ParseError::TooFewRows));
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            parse_pasted_forecast("2025\t2026\t2027\n10\t20"),
            Err(ParseError::LengthMismatch { years: 3, revenues: 2 })
        );
        assert_eq!(
            parse_pasted_forecast("2025\t2026\n10\t20\t30"),
            Err(ParseError::LengthMismatch { years: 2, revenues: 3 })
        );
    }

    #[test]
    fn test_invalid_revenue_token() {
        assert_eq!(
            parse_pasted_forecast("2025\t2026\n10\tn/a"),
            Err(ParseError::InvalidRevenue { token: "n/a".to_string() })
        );
        assert_eq!(
            parse_pasted_forecast("2025\t2026\n10\t€"),
            Err(ParseError::InvalidRevenue { token: "€".to_string() })
        );
    }

    #[test]
    fn test_header_labels_are_invalid_years() {
        assert_eq!(
            parse_pasted_forecast("Year\t2025\t2026\nRevenue\t1\t2"),
            Err(ParseError::InvalidYear { token: "Year".to_string() })
        );
    }

    #[test]
    fn test_non_contiguous_years_are_parsed_but_flagged() {
        let parsed = parse_pasted_forecast("2025\t2027\t2030\n1\t2\t3").unwrap();
        assert_eq!(parsed.start_year, 2025);
        assert!(!parsed.is_contiguous());
    }

    #[test]
    fn test_clean_numeric_token() {
        assert_eq!(clean_numeric_token("€1,234,567.89"), "1234567.89");
        assert_eq!(clean_numeric_token(" -42 "), "-42");
        assert_eq!(clean_numeric_token("(1,234)"), "-1234");
        assert_eq!(clean_numeric_token("\u{2212}15"), "-15");
        assert_eq!(clean_numeric_token("EUR"), "");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        for token in ["€1,234.50", "-7", "(300)", "12 345", "abc", "0.001", "1e5"] {
            let once = clean_numeric_token(token);
            assert_eq!(clean_numeric_token(&once), once, "token {token}");
        }
    }

    #[test]
    fn test_scientific_notation() {
        let parsed = parse_pasted_forecast("2025\t2026\n1.5e6\t2e6").unwrap();
        assert_eq!(parsed.revenues, vec![1_500_000.0, 2_000_000.0]);
        assert_eq!(parse_revenue("1.25E+06"), Ok(1_250_000.0));
        assert_eq!(parse_revenue(" -3e-2 "), Ok(-0.03));
        assert_eq!(
            parse_revenue("€1.5e6"),
            Err(ParseError::InvalidRevenue { token: "€1.5e6".to_string() })
        );
    }

    #[test]
    fn test_non_finite_and_huge_revenues_are_rejected() {
        assert!(matches!(parse_revenue("inf"), Err(ParseError::InvalidRevenue { .. })));
        assert!(matches!(parse_revenue("NaN"), Err(ParseError::InvalidRevenue { .. })));
        assert_eq!(
            parse_revenue("1e300"),
            Err(ParseError::RevenueOutOfRange { token: "1e300".to_string() })
        );
        assert!(matches!(
            parse_revenue("1,000,000,000,000,000,000"),
            Err(ParseError::RevenueOutOfRange { .. })
        ));
        assert_eq!(parse_revenue("999,999,999,999,999"), Ok(999_999_999_999_999.0));
    }

    #[test]
    fn test_empty_token_is_not_zero() {
        assert!(parse_revenue("—").is_err());
        assert!(parse_revenue("").is_err());
        assert!(parse_revenue("-").is_err());
        assert!(parse_revenue("1.2.3").is_err());
    }
}
