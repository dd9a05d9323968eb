use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bucket granularity of a time series.
///
/// There is deliberately no year bucket: multi-year windows still group by
/// month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Day,
    Month,
}

/// Display-only axis granularity for charts (tick labelling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSpan {
    Week,
    Month,
    Year,
}

/// One bucket of a time series. Buckets are unique and ascending within a
/// series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub bucket_start: DateTime<Utc>,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(bucket_start: DateTime<Utc>, value: f64) -> Self {
        Self {
            bucket_start,
            value,
        }
    }
}

/// Total plus per-bucket history, the payload of every "over time" metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPayload {
    /// `None` when there is no data for the period.
    pub total: Option<f64>,
    pub history: Vec<SeriesPoint>,
}

/// Share of one dimension value (region, channel, provider, discount,
/// variant, status) within its period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityRow {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    pub count: u64,
    /// Share of the period total, two decimals, e.g. `"37.50"`.
    pub percentage: String,
}

/// Gap-free chart point: one per resolution step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub bucket: DateTime<Utc>,
    pub current_value: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub previous_bucket: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<f64>,
}

/// Chart-ready series for one history metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub resolution: Resolution,
    pub span: ChartSpan,
    pub points: Vec<ChartPoint>,
}
