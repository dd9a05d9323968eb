use anyhow::Result;
use contracts::dashboards::d413_products::ProductsDashboardResponse;
use contracts::shared::analytics::{MetricResponse, PopularityRow};

use crate::shared::analytics::aggregate::{popularity, DimensionEntry};
use crate::shared::analytics::{
    AnalyticsContext, AnalyticsRequest, AnalyticsSource, LineItemRecord, PeriodPlan,
    RecordFilter,
};

fn variant_rows(rows: &[LineItemRecord], limit: usize) -> Vec<PopularityRow> {
    popularity(
        rows.iter().map(|item| {
            DimensionEntry::labelled(
                item.variant_id.as_str(),
                item.variant_title.clone(),
                item.quantity,
            )
        }),
        Some(limit),
    )
}

/// Variants ranked by sold quantity, restricted to placed orders.
pub async fn variant_popularity(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<MetricResponse<Vec<PopularityRow>>> {
    let mut base = RecordFilter::statuses(&ctx.order_statuses);
    base.currency_code = request.currency_code.clone();

    let plan =
        PeriodPlan::resolve(&request.query, ctx, || source.earliest_line_item(&base)).await?;
    let Some(plan) = plan else {
        return Ok(MetricResponse::empty());
    };
    let rows = source.line_items(&plan.filter(base)).await?;
    tracing::debug!("Products: {} line items", rows.len());

    Ok(plan.aggregate(rows, |rows| variant_rows(rows, request.limit)))
}

pub async fn get_products_dashboard(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<ProductsDashboardResponse> {
    Ok(ProductsDashboardResponse {
        variants: variant_popularity(source, request, ctx).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analytics::test_fixtures::*;
    use crate::shared::analytics::MemorySource;

    #[tokio::test]
    async fn test_variants_ranked_by_quantity() {
        let mut orders = two_week_orders();
        orders[5].status = "canceled".to_string();
        let items = vec![
            line_item("p2", at(2024, 1, 3, 9), "v1", 4),
            line_item("n1", at(2024, 1, 8, 0), "v1", 1),
            line_item("n2", at(2024, 1, 8, 10), "v2", 9),
            line_item("n3", at(2024, 1, 10, 10), "v2", 2),
            line_item("n3", at(2024, 1, 10, 10), "v3", 3),
            line_item("n4", at(2024, 1, 12, 10), "v4", 1),
        ];
        let source = MemorySource::new().with_orders(orders).with_line_items(items);
        let mut request = week_comparison();
        request.limit = 2;

        let dashboard = get_products_dashboard(&source, &request, &ctx()).await.unwrap();

        // n2 was canceled: v2 keeps 2 of its 11 units
        let current = dashboard.variants.current();
        assert_eq!(current.len(), 2);
        assert_eq!(current[0].key, "v3");
        assert_eq!(current[0].label.as_deref(), Some("Variant v3"));
        assert_eq!(current[0].percentage, "42.86");
        assert_eq!(current[1].key, "v2");

        let previous = dashboard.variants.previous().unwrap();
        assert_eq!(previous[0].key, "v1");
        assert_eq!(previous[0].percentage, "100.00");
    }
}
