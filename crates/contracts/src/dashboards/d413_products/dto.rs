use serde::{Deserialize, Serialize};

use crate::shared::analytics::{MetricResponse, PopularityRow};

/// Response for the products dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsDashboardResponse {
    /// Variants ranked by sold quantity
    pub variants: MetricResponse<Vec<PopularityRow>>,
}
