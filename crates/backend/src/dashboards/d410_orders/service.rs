use anyhow::Result;
use contracts::dashboards::d410_orders::OrdersDashboardResponse;
use contracts::shared::analytics::{MetricResponse, PopularityRow, TimeSeriesPayload};

use crate::shared::analytics::aggregate::{popularity, time_series, DimensionEntry};
use crate::shared::analytics::chart::FillMode;
use crate::shared::analytics::{
    AnalyticsContext, AnalyticsRequest, AnalyticsSource, OrderRecord, PeriodPlan, RecordFilter,
};

/// Placed orders of the request's period, split into halves
pub(crate) async fn load_orders(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
    base: RecordFilter,
) -> Result<Option<(PeriodPlan, Vec<OrderRecord>)>> {
    let plan = PeriodPlan::resolve(&request.query, ctx, || source.earliest_order(&base)).await?;
    let Some(plan) = plan else {
        return Ok(None);
    };
    let rows = source.orders(&plan.filter(base)).await?;
    tracing::debug!(
        "Orders: {} rows in {}..{} ({:?})",
        rows.len(),
        plan.fetch_from,
        plan.fetch_to,
        plan.resolution
    );
    Ok(Some((plan, rows)))
}

/// Number of placed orders, total and per bucket.
pub async fn orders_count(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<(MetricResponse<TimeSeriesPayload>, Option<PeriodPlan>)> {
    let base = RecordFilter::statuses(&ctx.order_statuses);
    let Some((plan, rows)) = load_orders(source, request, ctx, base).await? else {
        return Ok((MetricResponse::empty(), None));
    };
    let metric = plan.aggregate(rows, |rows| time_series(rows, plan.resolution, ctx.tz, |_| 1.0));
    Ok((metric, Some(plan)))
}

fn status_rows(rows: &[OrderRecord]) -> Vec<PopularityRow> {
    popularity(
        rows.iter().map(|o| DimensionEntry::new(o.status.as_str(), 1)),
        None,
    )
}

fn provider_rows(rows: &[OrderRecord], limit: usize) -> Vec<PopularityRow> {
    popularity(
        rows.iter().filter_map(|o| {
            o.payment_provider_id
                .as_deref()
                .map(|provider| DimensionEntry::new(provider, 1))
        }),
        Some(limit),
    )
}

/// Orders dashboard: order count with chart, status and payment-provider
/// breakdowns. The status breakdown is fetched without the placed-status
/// filter so every status shows up.
pub async fn get_orders_dashboard(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<OrdersDashboardResponse> {
    let base = RecordFilter::statuses(&ctx.order_statuses);
    let Some((plan, rows)) = load_orders(source, request, ctx, base).await? else {
        tracing::info!("Orders dashboard: no orders, returning empty result");
        return Ok(OrdersDashboardResponse {
            orders_count: MetricResponse::empty(),
            orders_count_chart: None,
            statuses: MetricResponse::empty(),
            payment_providers: MetricResponse::empty(),
        });
    };

    let halves = plan.split(rows);
    let orders_count = plan.respond(
        halves
            .as_ref()
            .map(|rows| time_series(rows.as_slice(), plan.resolution, ctx.tz, |_| 1.0)),
    );
    let any_status = source.orders(&plan.filter(RecordFilter::default())).await?;
    let statuses = plan.respond(plan.split(any_status).map(|rows| status_rows(&rows)));
    let payment_providers =
        plan.respond(halves.as_ref().map(|rows| provider_rows(rows, request.limit)));
    let orders_count_chart = Some(plan.chart(&orders_count, FillMode::Zero, ctx));

    Ok(OrdersDashboardResponse {
        orders_count,
        orders_count_chart,
        statuses,
        payment_providers,
    })
}
