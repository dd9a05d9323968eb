use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d414_marketing::MarketingDashboardResponse;
use contracts::shared::analytics::AnalyticsQueryParams;

use super::{describe, prepare, status_for};
use crate::dashboards::d414_marketing::service;

/// GET /api/analytics/marketing
pub async fn get_marketing_dashboard(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<MarketingDashboardResponse>, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D414 Marketing: computing {}", describe(&prepared.request.query));

    match service::get_marketing_dashboard(&prepared.source, &prepared.request, &prepared.ctx).await {
        Ok(response) => {
            tracing::info!(
                "D414 Marketing: returning {} discounts, {} regions",
                response.discounts.current().len(),
                response.regions.current().len()
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D414 Marketing: Failed to compute dashboard: {:#}", e);
            Err(status_for(&e))
        }
    }
}
