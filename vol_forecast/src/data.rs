//! Dated series, price loading and return-series providers

use crate::error::{AnalysisError, Result};
use crate::utils::date_parser;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

/// A sequence of values indexed by calendar date.
///
/// Used for returns, conditional volatility, standardized residuals and VaR
/// thresholds. Missing observations are simply absent dates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    index: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Percentage log-returns indexed by date
pub type ReturnSeries = TimeSeries;

impl TimeSeries {
    /// Create a new series from an index and matching values
    pub fn new(index: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(AnalysisError::DataError(format!(
                "Index length ({}) doesn't match values length ({})",
                index.len(),
                values.len()
            )));
        }

        Ok(Self { index, values })
    }

    /// Get the index
    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(date, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Apply `f` to every value, keeping the index
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            index: self.index.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Replace the values, keeping the index
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        Self::new(self.index.clone(), values)
    }

    /// True when any value is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Index formatted as `YYYY-MM-DD` labels
    pub fn index_labels(&self) -> Vec<String> {
        self.index.iter().map(|d| date_parser::format_date(*d)).collect()
    }

    /// Keep only observations dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> Self {
        let (index, values) = self.iter().filter(|(d, _)| *d >= start).unzip();
        Self { index, values }
    }
}

/// Two series restricted to the dates they have in common
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub left: TimeSeries,
    pub right: TimeSeries,
}

impl AlignedPair {
    /// Number of common dates
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True when the series share no dates
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Inner join of two series on their dates.
///
/// Dates present in only one series are dropped. The output follows the order
/// of `left`, and a date repeated in either input is matched once using its
/// first occurrence.
pub fn align(left: &TimeSeries, right: &TimeSeries) -> AlignedPair {
    let mut lookup: HashMap<NaiveDate, f64> = HashMap::with_capacity(right.len());
    for (date, value) in right.iter() {
        lookup.entry(date).or_insert(value);
    }

    let mut seen = HashSet::with_capacity(left.len());
    let mut index = Vec::new();
    let mut left_values = Vec::new();
    let mut right_values = Vec::new();

    for (date, value) in left.iter() {
        if !seen.insert(date) {
            continue;
        }
        if let Some(&other) = lookup.get(&date) {
            index.push(date);
            left_values.push(value);
            right_values.push(other);
        }
    }

    AlignedPair {
        left: TimeSeries {
            index: index.clone(),
            values: left_values,
        },
        right: TimeSeries {
            index,
            values: right_values,
        },
    }
}

/// Daily prices for one instrument, sorted by date with unique dates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    prices: TimeSeries,
    price_column: String,
}

impl PriceHistory {
    /// Build a price history from unsorted rows; the first row for a date wins
    pub fn from_rows(rows: Vec<(NaiveDate, f64)>, price_column: &str) -> Self {
        let mut rows = rows;
        rows.sort_by_key(|(d, _)| *d);
        rows.dedup_by_key(|(d, _)| *d);

        let (index, values) = rows.into_iter().unzip();
        Self {
            prices: TimeSeries { index, values },
            price_column: price_column.to_string(),
        }
    }

    /// Get the prices
    pub fn prices(&self) -> &TimeSeries {
        &self.prices
    }

    /// Name of the column the prices were read from
    pub fn price_column(&self) -> &str {
        &self.price_column
    }

    /// Keep only prices dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> Self {
        Self {
            prices: self.prices.since(start),
            price_column: self.price_column.clone(),
        }
    }

    /// Percentage log-returns `100·ln(Pₜ/Pₜ₋₁)`, dated at `t`.
    ///
    /// The first observation has no return; non-finite results are dropped.
    pub fn log_returns(&self) -> ReturnSeries {
        let (index, values) = self
            .prices
            .index
            .windows(2)
            .zip(self.prices.values.windows(2))
            .map(|(d, p)| (d[1], 100.0 * (p[1] / p[0]).ln()))
            .filter(|(_, r)| r.is_finite())
            .unzip();

        TimeSeries { index, values }
    }
}

/// Data loader for daily price files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price history from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<PriceHistory> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(Some(100))
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Extract a price history from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame) -> Result<PriceHistory> {
        if df.height() == 0 {
            return Err(AnalysisError::DataUnavailable(
                "Price data contains no rows".to_string(),
            ));
        }

        let time_column = Self::detect_time_column(df)?;
        let price_column = Self::detect_price_column(df)?;

        let dates = df.column(&time_column)?.cast(&DataType::Utf8)?;
        let prices = df.column(&price_column)?.cast(&DataType::Float64)?;

        let mut rows = Vec::with_capacity(df.height());
        for (date, price) in dates.utf8()?.into_iter().zip(prices.f64()?.into_iter()) {
            // Rows with a missing date or price are dropped
            if let (Some(date), Some(price)) = (date, price) {
                rows.push((date_parser::parse_date(date)?, price));
            }
        }

        Ok(PriceHistory::from_rows(rows, &price_column))
    }

    /// Detect the time column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time")
            })
            .map(|name| name.to_string())
            .ok_or_else(|| AnalysisError::DataError("No date column found in data".to_string()))
    }

    /// Detect the price column, preferring adjusted close over close
    fn detect_price_column(df: &DataFrame) -> Result<String> {
        let names = df.get_column_names();
        let find = |pred: &dyn Fn(&str) -> bool| {
            names
                .iter()
                .find(|name| pred(&name.to_lowercase()))
                .map(|name| name.to_string())
        };

        find(&|n| n.contains("adj") && n.contains("close"))
            .or_else(|| find(&|n| n.contains("close")))
            .or_else(|| find(&|n| n.contains("price")))
            .ok_or_else(|| {
                AnalysisError::DataUnavailable("No price column found in downloaded data".to_string())
            })
    }
}

/// Source of return series for instruments
pub trait ReturnProvider {
    /// Percentage log-returns for `instrument` from `start` onwards
    fn fetch_returns(&self, instrument: &str, start: NaiveDate) -> Result<ReturnSeries>;
}

/// Reads `<data_dir>/<instrument>.csv` price files
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    data_dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the price file for an instrument
    pub fn path_for(&self, instrument: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", instrument))
    }
}

impl ReturnProvider for CsvPriceProvider {
    fn fetch_returns(&self, instrument: &str, start: NaiveDate) -> Result<ReturnSeries> {
        let path = self.path_for(instrument);
        if !path.is_file() {
            return Err(AnalysisError::DataUnavailable(format!(
                "No data downloaded for ticker {} ({} not found)",
                instrument,
                path.display()
            )));
        }

        let history = DataLoader::from_csv(&path)?.since(start);
        let returns = history.log_returns();

        if returns.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "No data downloaded for ticker {} since {}",
                instrument, start
            )));
        }

        tracing::debug!(
            instrument,
            column = history.price_column(),
            observations = returns.len(),
            "loaded returns"
        );

        Ok(returns)
    }
}
