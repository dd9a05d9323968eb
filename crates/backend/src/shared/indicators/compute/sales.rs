use anyhow::Result;
use contracts::shared::analytics::{MetricResponse, TimeSeriesPayload};
use contracts::shared::indicators::IndicatorValue;

use super::card;
use crate::dashboards::d411_sales::service::sales_total;
use crate::shared::analytics::{AnalyticsContext, AnalyticsRequest, AnalyticsSource};
use crate::shared::indicators::metadata::ids;

/// Card for a request without a currency: sales are only comparable within
/// one currency.
pub fn sales_total_unavailable() -> IndicatorValue {
    IndicatorValue::unavailable(
        ids::sales_total(),
        Some("Currency code required".to_string()),
    )
}

pub fn sales_total_card(metric: &MetricResponse<TimeSeriesPayload>) -> IndicatorValue {
    card(
        ids::sales_total(),
        metric,
        |p| Some(p.total.unwrap_or(0.0)),
        true,
    )
}

pub async fn compute_sales_total(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<IndicatorValue> {
    if request.currency_code.is_none() {
        return Ok(sales_total_unavailable());
    }
    let metric = sales_total(source, request, ctx).await?;
    Ok(sales_total_card(&metric))
}
