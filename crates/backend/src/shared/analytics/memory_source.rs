use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::partition::Timestamped;
use super::records::{CustomerRecord, LineItemRecord, OrderRecord};
use super::source::{AnalyticsSource, RecordFilter};

/// In-memory source: used by tests and by hosts that already hold the rows.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub orders: Vec<OrderRecord>,
    pub customers: Vec<CustomerRecord>,
    pub line_items: Vec<LineItemRecord>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(mut self, orders: Vec<OrderRecord>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_customers(mut self, customers: Vec<CustomerRecord>) -> Self {
        self.customers = customers;
        self
    }

    pub fn with_line_items(mut self, line_items: Vec<LineItemRecord>) -> Self {
        self.line_items = line_items;
        self
    }

    fn order_matches(order: &OrderRecord, filter: &RecordFilter) -> bool {
        filter.contains(order.created_at)
            && filter.accepts_status(&order.status)
            && filter.accepts_currency(&order.currency_code)
    }

    fn matching_line_items(&self, filter: &RecordFilter) -> Vec<&LineItemRecord> {
        let orders: HashMap<&str, &OrderRecord> =
            self.orders.iter().map(|o| (o.id.as_str(), o)).collect();
        self.line_items
            .iter()
            .filter(|item| filter.contains(item.created_at))
            .filter(|item| match orders.get(item.order_id.as_str()) {
                Some(order) => {
                    filter.accepts_status(&order.status)
                        && filter.accepts_currency(&order.currency_code)
                }
                None => filter.status_in.is_empty() && filter.currency_code.is_none(),
            })
            .collect()
    }
}

fn earliest<'a, R: Timestamped + 'a>(rows: impl Iterator<Item = &'a R>) -> Option<DateTime<Utc>> {
    rows.map(|r| r.created_at()).min()
}

#[async_trait]
impl AnalyticsSource for MemorySource {
    async fn orders(&self, filter: &RecordFilter) -> Result<Vec<OrderRecord>> {
        Ok(self
            .orders
            .iter()
            .filter(|o| Self::order_matches(o, filter))
            .cloned()
            .collect())
    }

    async fn earliest_order(&self, filter: &RecordFilter) -> Result<Option<DateTime<Utc>>> {
        Ok(earliest(
            self.orders.iter().filter(|o| Self::order_matches(o, filter)),
        ))
    }

    async fn customers(&self, filter: &RecordFilter) -> Result<Vec<CustomerRecord>> {
        Ok(self
            .customers
            .iter()
            .filter(|c| filter.contains(c.created_at))
            .cloned()
            .collect())
    }

    async fn earliest_customer(&self, filter: &RecordFilter) -> Result<Option<DateTime<Utc>>> {
        Ok(earliest(
            self.customers.iter().filter(|c| filter.contains(c.created_at)),
        ))
    }

    async fn count_customers(&self, filter: &RecordFilter) -> Result<u64> {
        Ok(self
            .customers
            .iter()
            .filter(|c| filter.contains(c.created_at))
            .count() as u64)
    }

    async fn line_items(&self, filter: &RecordFilter) -> Result<Vec<LineItemRecord>> {
        Ok(self
            .matching_line_items(filter)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn earliest_line_item(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<DateTime<Utc>>> {
        Ok(earliest(self.matching_line_items(filter).into_iter()))
    }
}
