use serde::{Deserialize, Serialize};

use crate::shared::analytics::{ChartSeries, MetricResponse, PopularityRow, TimeSeriesPayload};

/// Response for the orders dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersDashboardResponse {
    /// Number of placed orders, total and per bucket
    pub orders_count: MetricResponse<TimeSeriesPayload>,
    /// Gap-filled chart of `orders_count`, absent when there is no data
    pub orders_count_chart: Option<ChartSeries>,
    /// Orders grouped by status
    pub statuses: MetricResponse<Vec<PopularityRow>>,
    /// Orders grouped by payment provider
    pub payment_providers: MetricResponse<Vec<PopularityRow>>,
}
