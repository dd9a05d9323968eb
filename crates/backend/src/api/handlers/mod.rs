// Dashboard handlers (d410-d419)
pub mod d410_orders;
pub mod d411_sales;
pub mod d412_customers;
pub mod d413_products;
pub mod d414_marketing;
pub mod d419_report;

// Indicator cards
pub mod indicators;

use axum::http::StatusCode;
use chrono::Utc;
use contracts::shared::analytics::AnalyticsQueryParams;

use crate::shared::analytics::{
    AnalyticsContext, AnalyticsError, AnalyticsQuery, AnalyticsRequest, SeaOrmSource,
};
use crate::shared::config::analytics_settings;
use crate::shared::data::db::get_connection;

/// Everything a dashboard service needs for one HTTP request.
pub(crate) struct Prepared {
    pub source: SeaOrmSource,
    pub request: AnalyticsRequest,
    pub ctx: AnalyticsContext,
}

/// Build source, request and context from query-string parameters.
/// Invalid input answers 400, a broken setup 500.
pub(crate) fn prepare(params: &AnalyticsQueryParams) -> Result<Prepared, StatusCode> {
    let settings = analytics_settings();
    let ctx = AnalyticsContext::from_settings(&settings, Utc::now()).map_err(|e| {
        tracing::error!("Analytics: bad configuration: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let request =
        AnalyticsRequest::from_params(params, &ctx, settings.top_limit).map_err(|e| {
            tracing::warn!("Analytics: rejected query: {}", e);
            StatusCode::BAD_REQUEST
        })?;
    let db = get_connection().map_err(|e| {
        tracing::error!("Analytics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Prepared {
        source: SeaOrmSource::new(db.clone()),
        request,
        ctx,
    })
}

/// Input errors surfacing from a service map to 400, everything else to 500.
pub(crate) fn status_for(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<AnalyticsError>() {
        Some(AnalyticsError::UnknownTimezone(_)) | None => StatusCode::INTERNAL_SERVER_ERROR,
        Some(_) => StatusCode::BAD_REQUEST,
    }
}

/// Human-readable period for log lines.
pub(crate) fn describe(query: &AnalyticsQuery) -> String {
    fn day(value: Option<chrono::DateTime<Utc>>) -> String {
        value
            .map(|v| v.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "*".to_string())
    }

    let mut text = format!("{}..{}", day(query.from), day(query.to));
    if query.is_comparison() {
        text.push_str(&format!(
            " vs {}..{}",
            day(query.compare_from),
            day(query.compare_to)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analytics::test_fixtures::utc;

    #[test]
    fn test_status_for_errors() {
        assert_eq!(
            status_for(&AnalyticsError::MissingCurrency.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AnalyticsError::UnknownTimezone("Mars/Base".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&anyhow::anyhow!("database is locked")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_describe_period() {
        let query = AnalyticsQuery::between(utc(2024, 1, 8), utc(2024, 1, 14))
            .compared_to(utc(2024, 1, 1), utc(2024, 1, 7));
        assert_eq!(describe(&query), "2024-01-08..2024-01-14 vs 2024-01-01..2024-01-07");
        assert_eq!(describe(&AnalyticsQuery::all_time()), "*..*");
        let open_end = AnalyticsQuery {
            from: Some(utc(2024, 1, 8)),
            ..Default::default()
        };
        assert_eq!(describe(&open_end), "2024-01-08..*");
    }

    #[test]
    fn test_prepare_rejects_bad_dates() {
        let params = AnalyticsQueryParams {
            date_range_from: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert_eq!(prepare(&params).err(), Some(StatusCode::BAD_REQUEST));
    }
}
