use anyhow::Result;
use contracts::dashboards::d412_customers::{
    CustomersDashboardResponse, OrderFrequency, RepeatCustomerRate, RetentionRate,
};
use contracts::shared::analytics::{ChartSeries, MetricResponse, PeriodResult, TimeSeriesPayload};

use crate::dashboards::d410_orders::service::load_orders;
use crate::shared::analytics::aggregate::{
    cumulative_series, order_frequency, repeat_customer_rate, retention_rate, time_series,
};
use crate::shared::analytics::chart::FillMode;
use crate::shared::analytics::{
    AnalyticsContext, AnalyticsRequest, AnalyticsSource, OrderRecord, PeriodPlan, RecordFilter,
};

/// Registration metrics: new customers per bucket and the running total.
pub struct CustomerGrowth {
    pub new_customers: MetricResponse<TimeSeriesPayload>,
    pub new_customers_chart: Option<ChartSeries>,
    pub cumulative_customers: MetricResponse<TimeSeriesPayload>,
    pub cumulative_customers_chart: Option<ChartSeries>,
}

impl CustomerGrowth {
    fn empty() -> Self {
        Self {
            new_customers: MetricResponse::empty(),
            new_customers_chart: None,
            cumulative_customers: MetricResponse::empty(),
            cumulative_customers_chart: None,
        }
    }
}

pub async fn customer_growth(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<CustomerGrowth> {
    let all = RecordFilter::default();
    let plan = PeriodPlan::resolve(&request.query, ctx, || source.earliest_customer(&all)).await?;
    let Some(plan) = plan else {
        return Ok(CustomerGrowth::empty());
    };

    let rows = source.customers(&plan.filter(RecordFilter::default())).await?;
    // Running totals start from everyone registered before the fetched range.
    let base = source
        .count_customers(&RecordFilter::default().before(plan.fetch_from))
        .await?;
    tracing::debug!("Customers: {} rows, {} before {}", rows.len(), base, plan.fetch_from);

    let (resolution, tz) = (plan.resolution, ctx.tz);
    let halves = plan.split(rows);

    let new_customers = plan.respond(
        halves
            .as_ref()
            .map(|rows| time_series(rows.as_slice(), resolution, tz, |_| 1.0)),
    );

    let mut current_seed = base;
    let cumulative_customers = plan.respond(match halves.as_ref() {
        PeriodResult::Comparison { current, previous } => {
            current_seed = base + previous.len() as u64;
            PeriodResult::Comparison {
                current: cumulative_series(current.as_slice(), current_seed, resolution, tz),
                previous: cumulative_series(previous.as_slice(), base, resolution, tz),
            }
        }
        other => other.map(|rows| cumulative_series(rows.as_slice(), base, resolution, tz)),
    });

    Ok(CustomerGrowth {
        new_customers_chart: Some(plan.chart(&new_customers, FillMode::Zero, ctx)),
        cumulative_customers_chart: Some(plan.chart(
            &cumulative_customers,
            FillMode::CarryForward {
                current_seed: current_seed as f64,
                previous_seed: base as f64,
            },
            ctx,
        )),
        new_customers,
        cumulative_customers,
    })
}

fn repeat_rate(rows: &[OrderRecord]) -> RepeatCustomerRate {
    if rows.is_empty() {
        return RepeatCustomerRate::default();
    }
    let (repeat, distinct, rate) = repeat_customer_rate(rows, |o| o.customer_id.as_str());
    RepeatCustomerRate {
        repeat_customers: Some(repeat),
        ordering_customers: Some(distinct),
        rate,
    }
}

fn retention(rows: &[OrderRecord], total_customers: u64) -> RetentionRate {
    if rows.is_empty() {
        return RetentionRate::default();
    }
    let (retained, rate) = retention_rate(rows, |o| o.customer_id.as_str(), total_customers);
    RetentionRate {
        retained_customers: Some(retained),
        total_customers: Some(total_customers),
        rate,
    }
}

fn frequency(rows: &[OrderRecord]) -> OrderFrequency {
    if rows.is_empty() {
        return OrderFrequency::default();
    }
    let split = order_frequency(rows, |o| o.customer_id.as_str());
    OrderFrequency {
        total_orders: Some(split.total_orders),
        one_time_orders: Some(split.one_time_orders),
        repeat_orders: Some(split.repeat_orders),
        one_time_percentage: split.one_time_percentage,
        repeat_percentage: split.repeat_percentage,
    }
}

/// Order-derived customer metrics.
pub struct CustomerBehaviour {
    pub repeat_customer_rate: MetricResponse<RepeatCustomerRate>,
    pub retention_rate: MetricResponse<RetentionRate>,
    pub order_frequency: MetricResponse<OrderFrequency>,
}

pub async fn customer_behaviour(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<CustomerBehaviour> {
    let base = RecordFilter::statuses(&ctx.order_statuses);
    let Some((plan, rows)) = load_orders(source, request, ctx, base).await? else {
        return Ok(CustomerBehaviour {
            repeat_customer_rate: MetricResponse::empty(),
            retention_rate: MetricResponse::empty(),
            order_frequency: MetricResponse::empty(),
        });
    };
    // Retention is measured against every known customer, not the period's.
    let total_customers = source.count_customers(&RecordFilter::default()).await?;

    let halves = plan.split(rows);
    Ok(CustomerBehaviour {
        repeat_customer_rate: plan.respond(halves.as_ref().map(|rows| repeat_rate(rows))),
        retention_rate: plan
            .respond(halves.as_ref().map(|rows| retention(rows, total_customers))),
        order_frequency: plan.respond(halves.as_ref().map(|rows| frequency(rows))),
    })
}

/// Customers dashboard: registrations, running total, repeat and retention
/// rates and the order-frequency split.
pub async fn get_customers_dashboard(
    source: &dyn AnalyticsSource,
    request: &AnalyticsRequest,
    ctx: &AnalyticsContext,
) -> Result<CustomersDashboardResponse> {
    let growth = customer_growth(source, request, ctx).await?;
    let behaviour = customer_behaviour(source, request, ctx).await?;

    Ok(CustomersDashboardResponse {
        new_customers: growth.new_customers,
        new_customers_chart: growth.new_customers_chart,
        cumulative_customers: growth.cumulative_customers,
        cumulative_customers_chart: growth.cumulative_customers_chart,
        repeat_customer_rate: behaviour.repeat_customer_rate,
        retention_rate: behaviour.retention_rate,
        order_frequency: behaviour.order_frequency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analytics::test_fixtures::*;
    use crate::shared::analytics::{AnalyticsQuery, MemorySource};

    /// Current week: eight distinct customers, three of them order twice.
    fn busy_week() -> Vec<OrderRecord> {
        let mut orders = Vec::new();
        for (i, id) in ["a", "b", "c", "d", "e", "f", "g", "h"].iter().enumerate() {
            orders.push(order(&format!("o-{id}"), at(2024, 1, 8 + (i as u32 % 7), 10), id));
        }
        for id in ["a", "b", "c"] {
            orders.push(order(&format!("o2-{id}"), at(2024, 1, 13, 15), id));
        }
        orders.push(order("old-a", at(2024, 1, 2, 10), "a"));
        orders.push(order("old-z", at(2024, 1, 3, 10), "z"));
        orders
    }

    fn registered(n: usize) -> Vec<crate::shared::analytics::CustomerRecord> {
        (0..n)
            .map(|i| customer(&format!("cust-{i}"), at(2023, 12, 1, 0)))
            .collect()
    }

    #[tokio::test]
    async fn test_repeat_rate_scenario() {
        let source = MemorySource::new()
            .with_orders(busy_week())
            .with_customers(registered(10));

        let behaviour = customer_behaviour(&source, &week_comparison(), &ctx())
            .await
            .unwrap();

        let current = behaviour.repeat_customer_rate.current();
        assert_eq!(current.repeat_customers, Some(3));
        assert_eq!(current.ordering_customers, Some(8));
        assert_eq!(current.rate, Some(37.5));

        let previous = behaviour.repeat_customer_rate.previous().unwrap();
        assert_eq!(previous.ordering_customers, Some(2));
        assert_eq!(previous.rate, Some(0.0));

        let retention = behaviour.retention_rate.current();
        assert_eq!(retention.retained_customers, Some(8));
        assert_eq!(retention.total_customers, Some(10));
        assert_eq!(retention.rate, Some(80.0));

        let frequency = behaviour.order_frequency.current();
        assert_eq!(frequency.total_orders, Some(11));
        assert_eq!(frequency.repeat_orders, Some(6));
        assert_eq!(frequency.one_time_orders, Some(5));
    }

    #[tokio::test]
    async fn test_retention_without_customers_is_undefined() {
        let source = MemorySource::new().with_orders(busy_week());

        let behaviour = customer_behaviour(&source, &week_comparison(), &ctx())
            .await
            .unwrap();

        assert_eq!(behaviour.retention_rate.current().total_customers, Some(0));
        assert_eq!(behaviour.retention_rate.current().rate, None);
    }

    #[tokio::test]
    async fn test_cumulative_customers_carry_forward() {
        let customers = vec![
            customer("c0", at(2023, 12, 15, 9)),
            customer("c1", at(2024, 1, 2, 9)),
            customer("c2", at(2024, 1, 5, 9)),
            customer("c3", at(2024, 1, 9, 9)),
            customer("c4", at(2024, 1, 9, 18)),
            customer("c5", at(2024, 1, 12, 9)),
        ];
        let source = MemorySource::new().with_customers(customers);

        let growth = customer_growth(&source, &week_comparison(), &ctx())
            .await
            .unwrap();

        assert_eq!(growth.new_customers.current().total, Some(3.0));
        assert_eq!(
            growth.new_customers.previous().and_then(|p| p.total),
            Some(2.0)
        );

        let cumulative = &growth.cumulative_customers;
        let values: Vec<f64> = cumulative.current().history.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![5.0, 6.0]);
        assert_eq!(cumulative.current().total, Some(6.0));
        assert_eq!(cumulative.previous().and_then(|p| p.total), Some(3.0));

        let chart = growth.cumulative_customers_chart.unwrap();
        let current: Vec<f64> = chart.points.iter().map(|p| p.current_value).collect();
        assert_eq!(current, vec![3.0, 5.0, 5.0, 5.0, 6.0, 6.0, 6.0]);
        assert_eq!(chart.points[0].previous_value, Some(1.0));
        assert_eq!(chart.points[1].previous_value, Some(2.0));
        assert!(current.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_empty_source_keeps_shape() {
        let source = MemorySource::new();
        let request = AnalyticsRequest::new(AnalyticsQuery::all_time());

        let dashboard = get_customers_dashboard(&source, &request, &ctx()).await.unwrap();

        assert!(dashboard.new_customers.result.is_empty());
        assert!(dashboard.cumulative_customers_chart.is_none());
        assert_eq!(dashboard.repeat_customer_rate.current().rate, None);
        assert_eq!(
            dashboard.retention_rate.previous(),
            Some(&RetentionRate::default())
        );
        assert_eq!(dashboard.order_frequency.current().total_orders, None);
    }
}
