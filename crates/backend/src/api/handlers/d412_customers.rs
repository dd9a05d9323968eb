use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d412_customers::CustomersDashboardResponse;
use contracts::shared::analytics::AnalyticsQueryParams;

use super::{describe, prepare, status_for};
use crate::dashboards::d412_customers::service;

/// GET /api/analytics/customers
pub async fn get_customers_dashboard(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<CustomersDashboardResponse>, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D412 Customers: computing {}", describe(&prepared.request.query));

    match service::get_customers_dashboard(&prepared.source, &prepared.request, &prepared.ctx).await {
        Ok(response) => {
            tracing::info!(
                "D412 Customers: returning {} buckets",
                response.new_customers.current().history.len()
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D412 Customers: Failed to compute dashboard: {:#}", e);
            Err(status_for(&e))
        }
    }
}
