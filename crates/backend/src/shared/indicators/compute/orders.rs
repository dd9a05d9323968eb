use anyhow::Result;
use contracts::shared::analytics::{MetricResponse, TimeSeriesPayload};
use contracts::shared::indicators::IndicatorValue;

use super::card;
use crate::dashboards::d410_orders::service::orders_count;
use crate::shared::analytics::{AnalyticsContext, AnalyticsRequest, AnalyticsSource};
use crate::shared::indicators::metadata::ids;

pub fn orders_count_card(metric: &MetricResponse<TimeSeriesPayload>) -> IndicatorValue {
    card(
        ids::orders_count(),
        metric,
        |p| Some(p.total.unwrap_or(0.0)),
        true,
    )
}

pub async fn compute_orders_count(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<IndicatorValue> {
    let (metric, _) = orders_count(source, request, ctx).await?;
    Ok(orders_count_card(&metric))
}
