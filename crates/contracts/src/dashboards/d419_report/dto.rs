use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboards::d410_orders::OrdersDashboardResponse;
use crate::dashboards::d411_sales::SalesDashboardResponse;
use crate::dashboards::d412_customers::CustomersDashboardResponse;
use crate::dashboards::d413_products::ProductsDashboardResponse;
use crate::dashboards::d414_marketing::MarketingDashboardResponse;
use crate::shared::indicators::IndicatorValue;

/// Everything the report generator lays out for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub generated_at: DateTime<Utc>,
    /// IANA time zone the buckets were truncated in
    pub timezone: String,
    pub indicators: Vec<IndicatorValue>,
    pub orders: OrdersDashboardResponse,
    /// Absent when no currency code was supplied
    pub sales: Option<SalesDashboardResponse>,
    pub customers: CustomersDashboardResponse,
    pub products: ProductsDashboardResponse,
    pub marketing: MarketingDashboardResponse,
}
