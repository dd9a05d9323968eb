//! Record builders shared by the dashboard and indicator tests.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::records::{CustomerRecord, LineItemRecord, OrderRecord};
use super::{AnalyticsContext, AnalyticsQuery, AnalyticsRequest};

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap()
}

/// Context pinned to 2024-01-20 12:00 UTC.
pub fn ctx() -> AnalyticsContext {
    AnalyticsContext::new(at(2024, 1, 20, 12), chrono_tz::UTC)
}

pub fn ctx_in(tz: Tz) -> AnalyticsContext {
    AnalyticsContext::new(at(2024, 1, 20, 12), tz)
}

/// Week of 2024-01-08 compared with the week before.
pub fn week_comparison() -> AnalyticsRequest {
    AnalyticsRequest::new(
        AnalyticsQuery::between(utc(2024, 1, 8), utc(2024, 1, 14))
            .compared_to(utc(2024, 1, 1), utc(2024, 1, 7)),
    )
}

pub fn order(id: &str, created_at: DateTime<Utc>, customer_id: &str) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        created_at,
        customer_id: customer_id.to_string(),
        status: "completed".to_string(),
        currency_code: "usd".to_string(),
        total: 10.0,
        region_id: None,
        sales_channel_id: None,
        payment_provider_id: None,
        discount_codes: Vec::new(),
    }
}

pub fn customer(id: &str, created_at: DateTime<Utc>) -> CustomerRecord {
    CustomerRecord {
        id: id.to_string(),
        created_at,
        has_account: true,
    }
}

pub fn line_item(
    order_id: &str,
    created_at: DateTime<Utc>,
    variant_id: &str,
    quantity: u64,
) -> LineItemRecord {
    LineItemRecord {
        order_id: order_id.to_string(),
        created_at,
        variant_id: variant_id.to_string(),
        variant_title: Some(format!("Variant {variant_id}")),
        quantity,
    }
}

/// Ten completed orders: four in the comparison week of
/// [`week_comparison`], six in the current one.
pub fn two_week_orders() -> Vec<OrderRecord> {
    vec![
        order("p1", at(2024, 1, 1, 9), "c1"),
        order("p2", at(2024, 1, 3, 9), "c2"),
        order("p3", at(2024, 1, 5, 9), "c2"),
        order("p4", at(2024, 1, 7, 23), "c3"),
        order("n1", at(2024, 1, 8, 0), "c1"),
        order("n2", at(2024, 1, 8, 10), "c4"),
        order("n3", at(2024, 1, 10, 10), "c4"),
        order("n4", at(2024, 1, 12, 10), "c5"),
        order("n5", at(2024, 1, 14, 10), "c6"),
        order("n6", at(2024, 1, 14, 22), "c1"),
    ]
}
