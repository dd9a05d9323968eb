use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d413_products::ProductsDashboardResponse;
use contracts::shared::analytics::AnalyticsQueryParams;

use super::{describe, prepare, status_for};
use crate::dashboards::d413_products::service;

/// GET /api/analytics/products
pub async fn get_products_dashboard(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<ProductsDashboardResponse>, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D413 Products: computing {}", describe(&prepared.request.query));

    match service::get_products_dashboard(&prepared.source, &prepared.request, &prepared.ctx).await {
        Ok(response) => {
            tracing::info!("D413 Products: returning {} variants", response.variants.current().len());
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D413 Products: Failed to compute dashboard: {:#}", e);
            Err(status_for(&e))
        }
    }
}
