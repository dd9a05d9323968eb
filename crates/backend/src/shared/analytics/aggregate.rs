//! Aggregation routines applied to one period's rows.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use contracts::shared::analytics::{PopularityRow, Resolution, SeriesPoint, TimeSeriesPayload};
use std::collections::{BTreeMap, HashMap};

use super::compare::ratio_percent;
use super::partition::Timestamped;
use super::resolution::truncate;
use crate::shared::format::format_percentage;

/// Sum `measure` per bucket. Buckets are unique and ascending.
pub fn bucket_sums<R: Timestamped>(
    rows: &[R],
    resolution: Resolution,
    tz: Tz,
    measure: impl Fn(&R) -> f64,
) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
    for row in rows {
        *buckets
            .entry(truncate(row.created_at(), resolution, tz))
            .or_insert(0.0) += measure(row);
    }
    buckets
        .into_iter()
        .map(|(bucket_start, value)| SeriesPoint::new(bucket_start, value))
        .collect()
}

/// Row count per bucket.
pub fn bucket_counts<R: Timestamped>(
    rows: &[R],
    resolution: Resolution,
    tz: Tz,
) -> Vec<SeriesPoint> {
    bucket_sums(rows, resolution, tz, |_| 1.0)
}

/// Total and history of `measure`; an empty period gives the empty payload.
pub fn time_series<R: Timestamped>(
    rows: &[R],
    resolution: Resolution,
    tz: Tz,
    measure: impl Fn(&R) -> f64,
) -> TimeSeriesPayload {
    if rows.is_empty() {
        return TimeSeriesPayload::default();
    }
    let history = bucket_sums(rows, resolution, tz, measure);
    TimeSeriesPayload {
        total: Some(history.iter().map(|p| p.value).sum()),
        history,
    }
}

/// Running total of per-bucket counts, starting from `base` (the number of
/// records strictly before the period). The last value equals `base` plus
/// every counted record.
pub fn cumulative(series: &[SeriesPoint], base: u64) -> Vec<SeriesPoint> {
    let mut running = base as f64;
    series
        .iter()
        .map(|point| {
            running += point.value;
            SeriesPoint::new(point.bucket_start, running)
        })
        .collect()
}

/// Cumulative payload for one period: `total` is the running total at the end
/// of the period.
pub fn cumulative_series<R: Timestamped>(
    rows: &[R],
    base: u64,
    resolution: Resolution,
    tz: Tz,
) -> TimeSeriesPayload {
    let history = cumulative(&bucket_counts(rows, resolution, tz), base);
    let total = base + rows.len() as u64;
    TimeSeriesPayload {
        total: (total > 0).then_some(total as f64),
        history,
    }
}

/// One contribution to a popularity table.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionEntry {
    pub key: String,
    pub label: Option<String>,
    pub count: u64,
}

impl DimensionEntry {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            label: None,
            count,
        }
    }

    pub fn labelled(key: impl Into<String>, label: Option<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            label,
            count,
        }
    }
}

/// Group entries by key, sum their counts and express each group as a share
/// of all groups. Sorted by count (descending) then key; the share is
/// computed before `limit` cuts the table.
pub fn popularity(
    entries: impl IntoIterator<Item = DimensionEntry>,
    limit: Option<usize>,
) -> Vec<PopularityRow> {
    let mut groups: HashMap<String, (Option<String>, u64)> = HashMap::new();
    for entry in entries {
        let group = groups.entry(entry.key).or_insert((None, 0));
        if group.0.is_none() {
            group.0 = entry.label;
        }
        group.1 += entry.count;
    }

    let total: u64 = groups.values().map(|(_, count)| count).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut rows: Vec<PopularityRow> = groups
        .into_iter()
        .map(|(key, (label, count))| PopularityRow {
            key,
            label,
            count,
            percentage: format_percentage(count as f64 * 100.0 / total as f64),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

/// Order count per customer.
pub fn orders_per_customer<'a, R>(
    rows: &'a [R],
    customer: impl Fn(&'a R) -> &'a str,
) -> HashMap<&'a str, u64> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        *counts.entry(customer(row)).or_insert(0) += 1;
    }
    counts
}

/// `(customers with more than one order, distinct customers, rate)`.
pub fn repeat_customer_rate<'a, R>(
    rows: &'a [R],
    customer: impl Fn(&'a R) -> &'a str,
) -> (u64, u64, Option<f64>) {
    let counts = orders_per_customer(rows, customer);
    let distinct = counts.len() as u64;
    let repeat = counts.values().filter(|&&n| n > 1).count() as u64;
    (repeat, distinct, ratio_percent(repeat, distinct))
}

/// `(distinct ordering customers, rate against total_customers)`.
///
/// The denominator is the global customer count, not the period's.
pub fn retention_rate<'a, R>(
    rows: &'a [R],
    customer: impl Fn(&'a R) -> &'a str,
    total_customers: u64,
) -> (u64, Option<f64>) {
    let distinct = orders_per_customer(rows, customer).len() as u64;
    (distinct, ratio_percent(distinct, total_customers))
}

/// Orders placed by one-time vs repeat customers within the period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySplit {
    pub total_orders: u64,
    pub one_time_orders: u64,
    pub repeat_orders: u64,
    pub one_time_percentage: Option<f64>,
    pub repeat_percentage: Option<f64>,
}

pub fn order_frequency<'a, R>(
    rows: &'a [R],
    customer: impl Fn(&'a R) -> &'a str,
) -> FrequencySplit {
    let counts = orders_per_customer(rows, customer);
    let total_orders = rows.len() as u64;
    let one_time_orders = counts.values().filter(|&&n| n == 1).count() as u64;
    let repeat_orders = total_orders - one_time_orders;
    FrequencySplit {
        total_orders,
        one_time_orders,
        repeat_orders,
        one_time_percentage: ratio_percent(one_time_orders, total_orders),
        repeat_percentage: ratio_percent(repeat_orders, total_orders),
    }
}
