use anyhow::Result;
use contracts::dashboards::d412_customers::{RepeatCustomerRate, RetentionRate};
use contracts::shared::analytics::{MetricResponse, TimeSeriesPayload};
use contracts::shared::indicators::IndicatorValue;

use super::card;
use crate::dashboards::d412_customers::service::{customer_behaviour, customer_growth};
use crate::shared::analytics::{AnalyticsContext, AnalyticsRequest, AnalyticsSource};
use crate::shared::indicators::metadata::ids;

pub fn new_customers_card(metric: &MetricResponse<TimeSeriesPayload>) -> IndicatorValue {
    card(
        ids::new_customers(),
        metric,
        |p| Some(p.total.unwrap_or(0.0)),
        true,
    )
}

pub fn repeat_customer_rate_card(metric: &MetricResponse<RepeatCustomerRate>) -> IndicatorValue {
    card(ids::repeat_customer_rate(), metric, |r| r.rate, true)
}

pub fn retention_rate_card(metric: &MetricResponse<RetentionRate>) -> IndicatorValue {
    card(ids::retention_rate(), metric, |r| r.rate, true)
}

pub async fn compute_new_customers(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<IndicatorValue> {
    let growth = customer_growth(source, request, ctx).await?;
    Ok(new_customers_card(&growth.new_customers))
}

pub async fn compute_repeat_customer_rate(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<IndicatorValue> {
    let behaviour = customer_behaviour(source, request, ctx).await?;
    Ok(repeat_customer_rate_card(&behaviour.repeat_customer_rate))
}

pub async fn compute_retention_rate(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<IndicatorValue> {
    let behaviour = customer_behaviour(source, request, ctx).await?;
    Ok(retention_rate_card(&behaviour.retention_rate))
}
