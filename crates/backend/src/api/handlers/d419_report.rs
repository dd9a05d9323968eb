use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d419_report::AnalyticsReport;
use contracts::shared::analytics::AnalyticsQueryParams;

use super::{describe, prepare, status_for};
use crate::dashboards::d419_report::{csv_export, service};

/// GET /api/analytics/report
///
/// Every dashboard plus the indicator cards for one period, as consumed by
/// the PDF generator.
pub async fn get_report(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<AnalyticsReport>, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D419 Report: building {}", describe(&prepared.request.query));

    match service::get_analytics_report(&prepared.source, &prepared.request, &prepared.ctx).await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!("D419 Report: Failed to build report: {:#}", e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/analytics/report.csv
pub async fn get_report_csv(
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Response, StatusCode> {
    let prepared = prepare(&params)?;
    tracing::info!("D419 Report: exporting CSV {}", describe(&prepared.request.query));

    let report = service::get_analytics_report(&prepared.source, &prepared.request, &prepared.ctx)
        .await
        .map_err(|e| {
            tracing::error!("D419 Report: Failed to build report: {:#}", e);
            status_for(&e)
        })?;
    let csv = csv_export::report_to_csv(&report).map_err(|e| {
        tracing::error!("D419 Report: Failed to render CSV: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"analytics-report.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
