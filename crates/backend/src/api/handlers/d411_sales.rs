use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d411_sales::SalesDashboardResponse;
use contracts::shared::analytics::AnalyticsQueryParams;

use super::{describe, prepare, status_for};
use crate::dashboards::d411_sales::service;

/// GET /api/analytics/sales?currencyCode=usd
pub async fn get_sales_dashboard(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<SalesDashboardResponse>, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D411 Sales: computing {}", describe(&prepared.request.query));

    match service::get_sales_dashboard(&prepared.source, &prepared.request, &prepared.ctx).await {
        Ok(response) => {
            tracing::info!(
                "D411 Sales: returning {} buckets in {}",
                response.sales_total.current().history.len(),
                response.currency_code
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D411 Sales: Failed to compute dashboard: {:#}", e);
            Err(status_for(&e))
        }
    }
}
