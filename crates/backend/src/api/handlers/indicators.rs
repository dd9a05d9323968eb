use axum::{http::StatusCode, Json};
use contracts::shared::indicators::*;

use super::{describe, prepare};
use crate::shared::indicators::{metadata, registry::IndicatorRegistry};

/// POST /api/analytics/indicators/compute
///
/// Batch-computes a set of indicators for the given period and filters.
pub async fn compute_indicators(
    Json(req): Json<ComputeIndicatorsRequest>,
) -> Result<Json<ComputeIndicatorsResponse>, StatusCode> {
    let prepared = prepare(&req.context)?;
    tracing::info!(
        "Indicators: computing {} indicators for {}",
        req.indicator_ids.len(),
        describe(&prepared.request.query),
    );

    let registry = IndicatorRegistry::new();
    let values = registry
        .compute(
            &req.indicator_ids,
            &prepared.source,
            &prepared.request,
            &prepared.ctx,
        )
        .await;

    tracing::info!("Indicators: returning {} values", values.len());
    Ok(Json(ComputeIndicatorsResponse { values }))
}

/// GET /api/analytics/indicators/meta
///
/// Returns the full catalogue of available indicators and sets.
pub async fn get_indicator_catalog() -> Json<IndicatorCatalogResponse> {
    Json(metadata::build_catalog())
}
