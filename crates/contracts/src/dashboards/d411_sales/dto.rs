use serde::{Deserialize, Serialize};

use crate::shared::analytics::{ChartSeries, MetricResponse, PopularityRow, TimeSeriesPayload};

/// Response for the sales dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesDashboardResponse {
    /// Currency the totals are expressed in (lower-case ISO code)
    pub currency_code: String,
    /// Sum of order totals, overall and per bucket
    pub sales_total: MetricResponse<TimeSeriesPayload>,
    pub sales_total_chart: Option<ChartSeries>,
    /// Orders grouped by sales channel
    pub sales_channels: MetricResponse<Vec<PopularityRow>>,
}
