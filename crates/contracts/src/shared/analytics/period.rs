use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Period result
// ---------------------------------------------------------------------------

/// Outcome of one aggregator, tagged by how the period was resolved.
///
/// * `Comparison` - both a current and a comparison window were supplied.
/// * `Single` - only the current window (or "all time") was computed.
/// * `Empty` - no start could be resolved: there is no data at all. Both
///   halves carry the empty shape so consumers never special-case it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum PeriodResult<T> {
    Comparison { current: T, previous: T },
    Single { current: T },
    Empty { current: T, previous: T },
}

impl<T> PeriodResult<T> {
    pub fn current(&self) -> &T {
        match self {
            Self::Comparison { current, .. }
            | Self::Single { current }
            | Self::Empty { current, .. } => current,
        }
    }

    pub fn previous(&self) -> Option<&T> {
        match self {
            Self::Comparison { previous, .. } | Self::Empty { previous, .. } => Some(previous),
            Self::Single { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn as_ref(&self) -> PeriodResult<&T> {
        match self {
            Self::Comparison { current, previous } => PeriodResult::Comparison { current, previous },
            Self::Single { current } => PeriodResult::Single { current },
            Self::Empty { current, previous } => PeriodResult::Empty { current, previous },
        }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> PeriodResult<U> {
        match self {
            Self::Comparison { current, previous } => PeriodResult::Comparison {
                current: f(current),
                previous: f(previous),
            },
            Self::Single { current } => PeriodResult::Single { current: f(current) },
            Self::Empty { current, previous } => PeriodResult::Empty {
                current: f(current),
                previous: f(previous),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Envelope returned for every metric.
///
/// The four date fields are epoch milliseconds and are omitted from JSON when
/// absent; `dateRangeFrom` being present means there is data to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse<T> {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub date_range_from: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub date_range_to: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub date_range_from_compare_to: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub date_range_to_compare_to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub result: PeriodResult<T>,
}

impl<T: Default> MetricResponse<T> {
    /// "No data" response: every date unset, both halves empty.
    pub fn empty() -> Self {
        Self {
            date_range_from: None,
            date_range_to: None,
            date_range_from_compare_to: None,
            date_range_to_compare_to: None,
            result: PeriodResult::Empty {
                current: T::default(),
                previous: T::default(),
            },
        }
    }
}

impl<T> MetricResponse<T> {
    pub fn current(&self) -> &T {
        self.result.current()
    }

    pub fn previous(&self) -> Option<&T> {
        self.result.previous()
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> MetricResponse<U> {
        MetricResponse {
            date_range_from: self.date_range_from,
            date_range_to: self.date_range_to,
            date_range_from_compare_to: self.date_range_from_compare_to,
            date_range_to_compare_to: self.date_range_to_compare_to,
            result: self.result.map(f),
        }
    }
}
