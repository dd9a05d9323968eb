use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d410_orders::OrdersDashboardResponse;
use contracts::shared::analytics::AnalyticsQueryParams;

use super::{describe, prepare, status_for};
use crate::dashboards::d410_orders::service;

/// GET /api/analytics/orders
pub async fn get_orders_dashboard(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<OrdersDashboardResponse>, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D410 Orders: computing {}", describe(&prepared.request.query));

    match service::get_orders_dashboard(&prepared.source, &prepared.request, &prepared.ctx).await {
        Ok(response) => {
            tracing::info!("D410 Orders: returning {} buckets", response.orders_count.current().history.len());
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D410 Orders: Failed to compute dashboard: {:#}", e);
            Err(status_for(&e))
        }
    }
}
