use anyhow::Result;
use contracts::dashboards::d419_report::AnalyticsReport;

use crate::dashboards::d410_orders::service::get_orders_dashboard;
use crate::dashboards::d411_sales::service::get_sales_dashboard;
use crate::dashboards::d412_customers::service::get_customers_dashboard;
use crate::dashboards::d413_products::service::get_products_dashboard;
use crate::dashboards::d414_marketing::service::get_marketing_dashboard;
use crate::shared::analytics::{AnalyticsContext, AnalyticsRequest, AnalyticsSource};
use crate::shared::indicators::compute::customers::{
    new_customers_card, repeat_customer_rate_card, retention_rate_card,
};
use crate::shared::indicators::compute::orders::orders_count_card;
use crate::shared::indicators::compute::sales::{sales_total_card, sales_total_unavailable};

/// Assemble every dashboard and the indicator cards for one query.
///
/// Sales are only included when the request names a currency. The cards are
/// built from the dashboards already loaded, in catalogue order.
pub async fn get_analytics_report(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<AnalyticsReport> {
    let orders = get_orders_dashboard(source, request, ctx).await?;
    let sales = match request.currency_code {
        Some(_) => Some(get_sales_dashboard(source, request, ctx).await?),
        None => None,
    };
    let customers = get_customers_dashboard(source, request, ctx).await?;
    let products = get_products_dashboard(source, request, ctx).await?;
    let marketing = get_marketing_dashboard(source, request, ctx).await?;
    let indicators = vec![
        orders_count_card(&orders.orders_count),
        sales
            .as_ref()
            .map(|sales| sales_total_card(&sales.sales_total))
            .unwrap_or_else(sales_total_unavailable),
        new_customers_card(&customers.new_customers),
        repeat_customer_rate_card(&customers.repeat_customer_rate),
        retention_rate_card(&customers.retention_rate),
    ];

    tracing::info!(
        "Report: {} indicators, sales {}",
        indicators.len(),
        if sales.is_some() { "included" } else { "skipped" }
    );

    Ok(AnalyticsReport {
        generated_at: ctx.now,
        timezone: ctx.tz.name().to_string(),
        indicators,
        orders,
        sales,
        customers,
        products,
        marketing,
    })
}
