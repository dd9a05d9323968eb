use serde::{Deserialize, Serialize};

use crate::shared::analytics::{ChartSeries, MetricResponse, TimeSeriesPayload};

/// Customers with more than one order relative to all ordering customers,
/// both counted inside the period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatCustomerRate {
    pub repeat_customers: Option<u64>,
    pub ordering_customers: Option<u64>,
    /// Percent, `None` when nobody ordered
    pub rate: Option<f64>,
}

/// Customers that ordered inside the period relative to every known
/// customer (global denominator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionRate {
    pub retained_customers: Option<u64>,
    pub total_customers: Option<u64>,
    pub rate: Option<f64>,
}

/// Orders split by whether their customer ordered once or repeatedly in the
/// period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFrequency {
    pub total_orders: Option<u64>,
    pub one_time_orders: Option<u64>,
    pub repeat_orders: Option<u64>,
    pub one_time_percentage: Option<f64>,
    pub repeat_percentage: Option<f64>,
}

/// Response for the customers dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersDashboardResponse {
    /// Customers registered in the period, total and per bucket
    pub new_customers: MetricResponse<TimeSeriesPayload>,
    pub new_customers_chart: Option<ChartSeries>,
    /// Running total of registered customers
    pub cumulative_customers: MetricResponse<TimeSeriesPayload>,
    pub cumulative_customers_chart: Option<ChartSeries>,
    pub repeat_customer_rate: MetricResponse<RepeatCustomerRate>,
    pub retention_rate: MetricResponse<RetentionRate>,
    pub order_frequency: MetricResponse<OrderFrequency>,
}
