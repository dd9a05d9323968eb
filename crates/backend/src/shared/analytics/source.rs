use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::records::{CustomerRecord, LineItemRecord, OrderRecord};

/// Row filter understood by every source.
///
/// `created_at_from` is inclusive, `created_at_to` exclusive. `status_in`
/// and `currency_code` apply to orders (and to line items through their
/// order); an empty `status_in` means any status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub status_in: Vec<String>,
    pub created_at_from: Option<DateTime<Utc>>,
    pub created_at_to: Option<DateTime<Utc>>,
    pub currency_code: Option<String>,
}

impl RecordFilter {
    pub fn statuses(statuses: &[String]) -> Self {
        Self {
            status_in: statuses.to_vec(),
            ..Default::default()
        }
    }

    pub fn with_currency(mut self, currency_code: Option<&str>) -> Self {
        self.currency_code = currency_code.map(str::to_lowercase);
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_at_from = Some(from);
        self.created_at_to = Some(to);
        self
    }

    pub fn before(mut self, to: DateTime<Utc>) -> Self {
        self.created_at_from = None;
        self.created_at_to = Some(to);
        self
    }

    /// Whether `created_at` falls inside the date bounds.
    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        self.created_at_from.map_or(true, |from| created_at >= from)
            && self.created_at_to.map_or(true, |to| created_at < to)
    }

    pub fn accepts_status(&self, status: &str) -> bool {
        self.status_in.is_empty() || self.status_in.iter().any(|s| s == status)
    }

    pub fn accepts_currency(&self, currency_code: &str) -> bool {
        self.currency_code
            .as_deref()
            .map_or(true, |c| c.eq_ignore_ascii_case(currency_code))
    }
}

/// Row-fetch capability consumed by the analytics core.
///
/// Implementations only read; failures propagate to the caller untouched.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn orders(&self, filter: &RecordFilter) -> Result<Vec<OrderRecord>>;

    /// Creation time of the oldest order matching `filter`, `None` when there
    /// are none.
    async fn earliest_order(&self, filter: &RecordFilter) -> Result<Option<DateTime<Utc>>>;

    async fn customers(&self, filter: &RecordFilter) -> Result<Vec<CustomerRecord>>;

    async fn earliest_customer(&self, filter: &RecordFilter) -> Result<Option<DateTime<Utc>>>;

    async fn count_customers(&self, filter: &RecordFilter) -> Result<u64>;

    async fn line_items(&self, filter: &RecordFilter) -> Result<Vec<LineItemRecord>>;

    async fn earliest_line_item(&self, filter: &RecordFilter)
        -> Result<Option<DateTime<Utc>>>;
}
