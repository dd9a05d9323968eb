//! Flat CSV rendering of an [`AnalyticsReport`], one line per value.

use anyhow::Result;
use chrono::SecondsFormat;
use contracts::dashboards::d419_report::AnalyticsReport;
use contracts::shared::analytics::{MetricResponse, PopularityRow, TimeSeriesPayload};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    section: &'a str,
    metric: &'a str,
    period: &'a str,
    key: String,
    label: String,
    value: String,
    percentage: String,
}

struct CsvSink<'a> {
    rows: Vec<CsvRow<'a>>,
}

fn halves<T>(metric: &MetricResponse<T>) -> impl Iterator<Item = (&'static str, &T)> {
    std::iter::once(("current", metric.current()))
        .chain(metric.previous().map(|previous| ("previous", previous)))
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl<'a> CsvSink<'a> {
    fn push(&mut self, section: &'a str, metric: &'a str, period: &'a str, key: String, value: String) {
        self.rows.push(CsvRow {
            section,
            metric,
            period,
            key,
            label: String::new(),
            value,
            percentage: String::new(),
        });
    }

    fn series(&mut self, section: &'a str, metric: &'a str, response: &MetricResponse<TimeSeriesPayload>) {
        for (period, payload) in halves(response) {
            self.push(section, metric, period, "total".to_string(), number(payload.total));
            for point in &payload.history {
                self.push(
                    section,
                    metric,
                    period,
                    point.bucket_start.to_rfc3339_opts(SecondsFormat::Secs, true),
                    point.value.to_string(),
                );
            }
        }
    }

    fn table(&mut self, section: &'a str, metric: &'a str, response: &MetricResponse<Vec<PopularityRow>>) {
        for (period, rows) in halves(response) {
            for row in rows {
                self.rows.push(CsvRow {
                    section,
                    metric,
                    period,
                    key: row.key.clone(),
                    label: row.label.clone().unwrap_or_default(),
                    value: row.count.to_string(),
                    percentage: row.percentage.clone(),
                });
            }
        }
    }

    fn rate<T>(
        &mut self,
        section: &'a str,
        metric: &'a str,
        response: &MetricResponse<T>,
        rate: impl Fn(&T) -> Option<f64>,
    ) {
        for (period, payload) in halves(response) {
            self.push(section, metric, period, "rate".to_string(), number(rate(payload)));
        }
    }
}

/// Render the report as CSV with the header
/// `section,metric,period,key,label,value,percentage`.
pub fn report_to_csv(report: &AnalyticsReport) -> Result<String> {
    let mut sink = CsvSink { rows: Vec::new() };

    for indicator in &report.indicators {
        sink.push("indicators", &indicator.id.0, "current", "value".to_string(), number(indicator.value));
        if indicator.previous_value.is_some() {
            sink.push(
                "indicators",
                &indicator.id.0,
                "previous",
                "value".to_string(),
                number(indicator.previous_value),
            );
        }
    }

    sink.series("orders", "orders_count", &report.orders.orders_count);
    sink.table("orders", "statuses", &report.orders.statuses);
    sink.table("orders", "payment_providers", &report.orders.payment_providers);

    if let Some(sales) = &report.sales {
        sink.series("sales", "sales_total", &sales.sales_total);
        sink.table("sales", "sales_channels", &sales.sales_channels);
    }

    let customers = &report.customers;
    sink.series("customers", "new_customers", &customers.new_customers);
    sink.series("customers", "cumulative_customers", &customers.cumulative_customers);
    sink.rate("customers", "repeat_customer_rate", &customers.repeat_customer_rate, |r| r.rate);
    sink.rate("customers", "retention_rate", &customers.retention_rate, |r| r.rate);
    sink.rate("customers", "repeat_order_percentage", &customers.order_frequency, |f| {
        f.repeat_percentage
    });

    sink.table("products", "variants", &report.products.variants);
    sink.table("marketing", "discounts", &report.marketing.discounts);
    sink.table("marketing", "regions", &report.marketing.regions);

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in &sink.rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d419_report::service::get_analytics_report;
    use crate::shared::analytics::test_fixtures::*;
    use crate::shared::analytics::MemorySource;

    #[tokio::test]
    async fn test_report_csv_lines() {
        let mut orders = two_week_orders();
        orders[4].region_id = Some("eu, west".to_string());
        let source = MemorySource::new().with_orders(orders);
        let report = get_analytics_report(&source, &week_comparison().with_currency("usd"), &ctx())
            .await
            .unwrap();

        let csv = report_to_csv(&report).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("section,metric,period,key,label,value,percentage")
        );
        assert!(csv.contains("indicators,orders_count,current,value,,6,\n"));
        assert!(csv.contains("indicators,orders_count,previous,value,,4,\n"));
        assert!(csv.contains("orders,orders_count,current,2024-01-08T00:00:00Z,,2,\n"));
        assert!(csv.contains("sales,sales_total,previous,total,,40,\n"));
        assert!(csv.contains("marketing,regions,current,\"eu, west\",,1,100.00\n"));
    }
}
