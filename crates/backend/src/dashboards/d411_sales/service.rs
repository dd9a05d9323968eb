use anyhow::Result;
use contracts::dashboards::d411_sales::SalesDashboardResponse;
use contracts::shared::analytics::{MetricResponse, PopularityRow, TimeSeriesPayload};

use crate::dashboards::d410_orders::service::load_orders;
use crate::shared::analytics::aggregate::{popularity, time_series, DimensionEntry};
use crate::shared::analytics::chart::FillMode;
use crate::shared::analytics::{
    AnalyticsContext, AnalyticsError, AnalyticsRequest, AnalyticsSource, OrderRecord,
    RecordFilter,
};

fn currency_filter(request: &AnalyticsRequest, ctx: &AnalyticsContext) -> Result<(String, RecordFilter)> {
    let currency_code = request
        .currency_code
        .clone()
        .ok_or(AnalyticsError::MissingCurrency)?;
    let base = RecordFilter::statuses(&ctx.order_statuses).with_currency(Some(currency_code.as_str()));
    Ok((currency_code, base))
}

/// Sum of order totals in the requested currency, total and per bucket.
pub async fn sales_total(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<MetricResponse<TimeSeriesPayload>> {
    let (_, base) = currency_filter(request, ctx)?;
    let Some((plan, rows)) = load_orders(source, request, ctx, base).await? else {
        return Ok(MetricResponse::empty());
    };
    Ok(plan.aggregate(rows, |rows| time_series(rows, plan.resolution, ctx.tz, |o| o.total)))
}

fn channel_rows(rows: &[OrderRecord], limit: usize) -> Vec<PopularityRow> {
    popularity(
        rows.iter().filter_map(|o| {
            o.sales_channel_id
                .as_deref()
                .map(|channel| DimensionEntry::new(channel, 1))
        }),
        Some(limit),
    )
}

/// Sales dashboard for one currency: sales total with chart and the
/// sales-channel breakdown.
pub async fn get_sales_dashboard(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<SalesDashboardResponse> {
    let (currency_code, base) = currency_filter(request, ctx)?;
    let Some((plan, rows)) = load_orders(source, request, ctx, base).await? else {
        tracing::info!("Sales dashboard: no {} orders, returning empty result", currency_code);
        return Ok(SalesDashboardResponse {
            currency_code,
            sales_total: MetricResponse::empty(),
            sales_total_chart: None,
            sales_channels: MetricResponse::empty(),
        });
    };

    let halves = plan.split(rows);
    let sales_total = plan.respond(
        halves
            .as_ref()
            .map(|rows| time_series(rows.as_slice(), plan.resolution, ctx.tz, |o| o.total)),
    );
    let sales_channels = plan.respond(halves.as_ref().map(|rows| channel_rows(rows, request.limit)));
    let sales_total_chart = Some(plan.chart(&sales_total, FillMode::Zero, ctx));

    Ok(SalesDashboardResponse {
        currency_code,
        sales_total,
        sales_total_chart,
        sales_channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analytics::test_fixtures::*;
    use crate::shared::analytics::{AnalyticsQuery, MemorySource};

    fn priced_orders() -> Vec<OrderRecord> {
        let mut orders = two_week_orders();
        for (i, order) in orders.iter_mut().enumerate() {
            order.total = (i + 1) as f64 * 10.0;
        }
        orders[9].currency_code = "EUR".to_string();
        orders[4].sales_channel_id = Some("web".to_string());
        orders[5].sales_channel_id = Some("web".to_string());
        orders[6].sales_channel_id = Some("pos".to_string());
        orders
    }

    #[tokio::test]
    async fn test_sales_require_currency() {
        let source = MemorySource::new().with_orders(priced_orders());

        let err = get_sales_dashboard(&source, &week_comparison(), &ctx())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<AnalyticsError>(),
            Some(&AnalyticsError::MissingCurrency)
        );
    }

    #[tokio::test]
    async fn test_sales_totals_per_period() {
        let source = MemorySource::new().with_orders(priced_orders());
        let request = week_comparison().with_currency("USD");

        let dashboard = get_sales_dashboard(&source, &request, &ctx()).await.unwrap();

        assert_eq!(dashboard.currency_code, "usd");
        // n1..n5 are 50..90, n6 is in EUR
        assert_eq!(dashboard.sales_total.current().total, Some(350.0));
        assert_eq!(
            dashboard.sales_total.previous().and_then(|p| p.total),
            Some(100.0)
        );

        let channels = dashboard.sales_channels.current();
        assert_eq!(channels[0].key, "web");
        assert_eq!(channels[0].count, 2);
        assert_eq!(channels[1].percentage, "33.33");
        assert!(dashboard.sales_channels.previous().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_currency_is_empty() {
        let source = MemorySource::new().with_orders(priced_orders());
        let request =
            AnalyticsRequest::new(AnalyticsQuery::all_time()).with_currency("gbp");

        let total = sales_total(&source, &request, &ctx()).await.unwrap();

        assert!(total.result.is_empty());
        assert_eq!(total.current().total, None);
    }
}
