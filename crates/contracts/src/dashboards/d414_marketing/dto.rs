use serde::{Deserialize, Serialize};

use crate::shared::analytics::{MetricResponse, PopularityRow};

/// Response for the marketing dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingDashboardResponse {
    /// Orders per discount code
    pub discounts: MetricResponse<Vec<PopularityRow>>,
    /// Orders per region
    pub regions: MetricResponse<Vec<PopularityRow>>,
}
