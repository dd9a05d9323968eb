use anyhow::Result;
use contracts::dashboards::d414_marketing::MarketingDashboardResponse;
use contracts::shared::analytics::{MetricResponse, PopularityRow};

use crate::dashboards::d410_orders::service::load_orders;
use crate::shared::analytics::aggregate::{popularity, DimensionEntry};
use crate::shared::analytics::{
    AnalyticsContext, AnalyticsRequest, AnalyticsSource, OrderRecord, RecordFilter,
};

/// One entry per (order, discount code) pair.
fn discount_rows(rows: &[OrderRecord], limit: usize) -> Vec<PopularityRow> {
    popularity(
        rows.iter().flat_map(|o| {
            o.discount_codes
                .iter()
                .map(|code| DimensionEntry::new(code.as_str(), 1))
        }),
        Some(limit),
    )
}

fn region_rows(rows: &[OrderRecord], limit: usize) -> Vec<PopularityRow> {
    popularity(
        rows.iter()
            .filter_map(|o| o.region_id.as_deref().map(|region| DimensionEntry::new(region, 1))),
        Some(limit),
    )
}

/// Marketing dashboard: discount usage and orders per region.
pub async fn get_marketing_dashboard(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<MarketingDashboardResponse> {
    let base = RecordFilter::statuses(&ctx.order_statuses).with_currency(request.currency_code.as_deref());
    let Some((plan, rows)) = load_orders(source, request, ctx, base).await? else {
        tracing::info!("Marketing dashboard: no orders, returning empty result");
        return Ok(MarketingDashboardResponse {
            discounts: MetricResponse::empty(),
            regions: MetricResponse::empty(),
        });
    };

    let halves = plan.split(rows);
    Ok(MarketingDashboardResponse {
        discounts: plan.respond(halves.as_ref().map(|rows| discount_rows(rows, request.limit))),
        regions: plan.respond(halves.as_ref().map(|rows| region_rows(rows, request.limit))),
    })
}
