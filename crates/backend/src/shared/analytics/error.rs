use thiserror::Error;

/// Rejected analytics input. Upstream fetch failures are not wrapped here;
/// they propagate unchanged as `anyhow::Error`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Currency code is required for sales metrics")]
    MissingCurrency,

    #[error("Unknown time zone: {0}")]
    UnknownTimezone(String),
}
