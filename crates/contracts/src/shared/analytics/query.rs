use serde::{Deserialize, Serialize};

/// Raw query-string parameters accepted by every analytics endpoint.
///
/// Dates are either RFC 3339 timestamps, plain `YYYY-MM-DD` days, or epoch
/// milliseconds. Parsing happens on the backend.
///
/// ```text
/// GET /api/analytics/orders?dateRangeFrom=2024-01-08&dateRangeTo=2024-01-14
///     &dateRangeFromCompareTo=2024-01-01&dateRangeToCompareTo=2024-01-07
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQueryParams {
    #[serde(default)]
    pub date_range_from: Option<String>,
    #[serde(default)]
    pub date_range_to: Option<String>,
    #[serde(default)]
    pub date_range_from_compare_to: Option<String>,
    #[serde(default)]
    pub date_range_to_compare_to: Option<String>,
    /// Required by sales metrics, ignored elsewhere.
    #[serde(default)]
    pub currency_code: Option<String>,
    /// Row limit for popularity tables.
    #[serde(default)]
    pub limit: Option<usize>,
}
