//! Date-range / period-comparison core.
//!
//! Given a current window and an optional comparison window the core picks a
//! bucket resolution, fetches rows once through an [`AnalyticsSource`],
//! partitions them into the two periods and aggregates each half. All inputs
//! that would otherwise be ambient (current time, time zone) travel in an
//! [`AnalyticsContext`].

pub mod aggregate;
pub mod chart;
pub mod compare;
pub mod error;
pub mod memory_source;
pub mod partition;
pub mod records;
pub mod resolution;
pub mod source;
pub mod sql_source;
#[cfg(test)]
pub mod test_fixtures;
pub mod window;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use contracts::shared::analytics::AnalyticsQueryParams;

pub use error::AnalyticsError;
pub use memory_source::MemorySource;
pub use records::{CustomerRecord, LineItemRecord, OrderRecord};
pub use source::{AnalyticsSource, RecordFilter};
pub use sql_source::SeaOrmSource;
pub use window::{AnalyticsQuery, EndBound, PeriodPlan};

use crate::shared::config::AnalyticsSettings;

/// Default statuses counted as placed orders.
pub const DEFAULT_ORDER_STATUSES: [&str; 2] = ["pending", "completed"];

/// Default number of rows in popularity tables.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Environment of one computation: "now", the bucketing zone and the
/// deployment-wide query rules.
#[derive(Debug, Clone)]
pub struct AnalyticsContext {
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub end_bound: EndBound,
    pub order_statuses: Vec<String>,
}

impl AnalyticsContext {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            now,
            tz,
            end_bound: EndBound::InclusiveDay,
            order_statuses: DEFAULT_ORDER_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_settings(
        settings: &AnalyticsSettings,
        now: DateTime<Utc>,
    ) -> Result<Self, AnalyticsError> {
        let tz: Tz = settings
            .timezone
            .parse()
            .map_err(|_| AnalyticsError::UnknownTimezone(settings.timezone.clone()))?;
        Ok(Self {
            now,
            tz,
            end_bound: if settings.inclusive_end_day {
                EndBound::InclusiveDay
            } else {
                EndBound::Exact
            },
            order_statuses: settings.order_statuses.clone(),
        })
    }
}

/// Per-call input of every dashboard service.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsRequest {
    pub query: AnalyticsQuery,
    /// Lower-case ISO currency code; sales metrics require it.
    pub currency_code: Option<String>,
    pub limit: usize,
}

impl AnalyticsRequest {
    pub fn new(query: AnalyticsQuery) -> Self {
        Self {
            query,
            currency_code: None,
            limit: DEFAULT_TOP_LIMIT,
        }
    }

    pub fn with_currency(mut self, currency_code: &str) -> Self {
        self.currency_code = Some(currency_code.to_lowercase());
        self
    }

    /// Parse and validate raw query-string parameters.
    pub fn from_params(
        params: &AnalyticsQueryParams,
        ctx: &AnalyticsContext,
        default_limit: usize,
    ) -> Result<Self, AnalyticsError> {
        let query = AnalyticsQuery::parse(params, ctx.tz)?;
        let currency_code = match params.currency_code.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(code.to_lowercase())
            }
            Some(code) => return Err(AnalyticsError::InvalidCurrency(code.to_string())),
        };
        Ok(Self {
            query,
            currency_code,
            limit: params.limit.unwrap_or(default_limit).max(1),
        })
    }
}
