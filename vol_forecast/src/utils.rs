//! Utility functions for the vol_forecast crate

/// Parsing and formatting of calendar dates used as series index labels
pub mod date_parser {
    use crate::error::{AnalysisError, Result};
    use chrono::NaiveDate;

    /// Label format used in reports
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Parse a date label.
    ///
    /// Accepts plain `YYYY-MM-DD` as well as timestamps that start with one
    /// (`2023-01-03 00:00:00+00:00`, `2023-01-03T00:00:00`); the time part is
    /// ignored.
    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        let trimmed = s.trim();
        let head = trimmed.get(..10).unwrap_or(trimmed);

        NaiveDate::parse_from_str(head, DATE_FORMAT)
            .map_err(|e| AnalysisError::DataError(format!("Invalid date '{}': {}", s, e)))
    }

    /// Format a date as a report label
    pub fn format_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }
}
