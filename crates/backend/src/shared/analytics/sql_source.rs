//! Analytics source over the host platform's SQLite tables.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, FromQueryResult, Statement, Value};

use super::records::{CustomerRecord, LineItemRecord, OrderRecord};
use super::source::{AnalyticsSource, RecordFilter};

/// Timestamps are stored as RFC 3339 UTC text with millisecond precision so
/// that string comparison matches time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid created_at: {value}"))?
        .with_timezone(&Utc))
}

#[derive(Debug, FromQueryResult)]
struct OrderRow {
    id: String,
    created_at: String,
    customer_id: String,
    status: String,
    currency_code: String,
    total: f64,
    region_id: Option<String>,
    sales_channel_id: Option<String>,
    payment_provider_id: Option<String>,
    discount_codes: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct CustomerRow {
    id: String,
    created_at: String,
    has_account: i64,
}

#[derive(Debug, FromQueryResult)]
struct LineItemRow {
    order_id: String,
    created_at: String,
    variant_id: String,
    variant_title: Option<String>,
    quantity: i64,
}

#[derive(Debug, FromQueryResult)]
struct EarliestRow {
    earliest: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

/// Appends `AND ...` conditions for `filter` to a statement whose WHERE
/// clause is already open.
struct Conditions<'a> {
    sql: &'a mut String,
    params: &'a mut Vec<Value>,
}

impl Conditions<'_> {
    fn dates(&mut self, filter: &RecordFilter, column: &str) {
        if let Some(from) = filter.created_at_from {
            self.sql.push_str(&format!(" AND {column} >= ?"));
            self.params.push(format_timestamp(from).into());
        }
        if let Some(to) = filter.created_at_to {
            self.sql.push_str(&format!(" AND {column} < ?"));
            self.params.push(format_timestamp(to).into());
        }
    }

    fn order(&mut self, filter: &RecordFilter, alias: &str) {
        if !filter.status_in.is_empty() {
            let placeholders: Vec<&str> = filter.status_in.iter().map(|_| "?").collect();
            self.sql.push_str(&format!(
                " AND {alias}.status IN ({})",
                placeholders.join(", ")
            ));
            for status in &filter.status_in {
                self.params.push(status.clone().into());
            }
        }
        if let Some(ref currency) = filter.currency_code {
            self.sql
                .push_str(&format!(" AND LOWER({alias}.currency_code) = ?"));
            self.params.push(currency.to_lowercase().into());
        }
    }
}

fn statement(sql: &str, params: Vec<Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, params)
}

/// Reads orders, customers and line items with raw statements.
#[derive(Debug, Clone)]
pub struct SeaOrmSource {
    db: DatabaseConnection,
}

impl SeaOrmSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn earliest(&self, sql: String, params: Vec<Value>) -> Result<Option<DateTime<Utc>>> {
        let row = EarliestRow::find_by_statement(statement(&sql, params))
            .one(&self.db)
            .await?;
        row.and_then(|r| r.earliest)
            .map(|value| parse_timestamp(&value))
            .transpose()
    }
}

#[async_trait]
impl AnalyticsSource for SeaOrmSource {
    async fn orders(&self, filter: &RecordFilter) -> Result<Vec<OrderRecord>> {
        let mut sql = String::from(
            r#"
            SELECT
                o.id,
                o.created_at,
                o.customer_id,
                o.status,
                o.currency_code,
                CAST(o.total AS REAL)           AS total,
                o.region_id,
                o.sales_channel_id,
                o.payment_provider_id,
                GROUP_CONCAT(d.code)            AS discount_codes
            FROM "order" o
            LEFT JOIN order_discount d ON d.order_id = o.id
            WHERE 1 = 1
        "#,
        );
        let mut params = Vec::new();
        let mut conditions = Conditions {
            sql: &mut sql,
            params: &mut params,
        };
        conditions.dates(filter, "o.created_at");
        conditions.order(filter, "o");
        sql.push_str(" GROUP BY o.id ORDER BY o.created_at");

        let rows = OrderRow::find_by_statement(statement(&sql, params))
            .all(&self.db)
            .await?;
        tracing::debug!("Analytics: fetched {} orders", rows.len());

        rows.into_iter()
            .map(|row| {
                Ok(OrderRecord {
                    created_at: parse_timestamp(&row.created_at)?,
                    id: row.id,
                    customer_id: row.customer_id,
                    status: row.status,
                    currency_code: row.currency_code,
                    total: row.total,
                    region_id: row.region_id,
                    sales_channel_id: row.sales_channel_id,
                    payment_provider_id: row.payment_provider_id,
                    discount_codes: row
                        .discount_codes
                        .map(|codes| {
                            let mut codes: Vec<String> =
                                codes.split(',').map(str::to_string).collect();
                            codes.sort();
                            codes
                        })
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn earliest_order(&self, filter: &RecordFilter) -> Result<Option<DateTime<Utc>>> {
        let mut sql =
            String::from(r#"SELECT MIN(o.created_at) AS earliest FROM "order" o WHERE 1 = 1"#);
        let mut params = Vec::new();
        let mut conditions = Conditions {
            sql: &mut sql,
            params: &mut params,
        };
        conditions.dates(filter, "o.created_at");
        conditions.order(filter, "o");
        self.earliest(sql, params).await
    }

    async fn customers(&self, filter: &RecordFilter) -> Result<Vec<CustomerRecord>> {
        let mut sql =
            String::from("SELECT c.id, c.created_at, c.has_account FROM customer c WHERE 1 = 1");
        let mut params = Vec::new();
        Conditions {
            sql: &mut sql,
            params: &mut params,
        }
        .dates(filter, "c.created_at");
        sql.push_str(" ORDER BY c.created_at");

        let rows = CustomerRow::find_by_statement(statement(&sql, params))
            .all(&self.db)
            .await?;
        tracing::debug!("Analytics: fetched {} customers", rows.len());

        rows.into_iter()
            .map(|row| {
                Ok(CustomerRecord {
                    created_at: parse_timestamp(&row.created_at)?,
                    id: row.id,
                    has_account: row.has_account != 0,
                })
            })
            .collect()
    }

    async fn earliest_customer(&self, filter: &RecordFilter) -> Result<Option<DateTime<Utc>>> {
        let mut sql =
            String::from("SELECT MIN(c.created_at) AS earliest FROM customer c WHERE 1 = 1");
        let mut params = Vec::new();
        Conditions {
            sql: &mut sql,
            params: &mut params,
        }
        .dates(filter, "c.created_at");
        self.earliest(sql, params).await
    }

    async fn count_customers(&self, filter: &RecordFilter) -> Result<u64> {
        let mut sql = String::from(
            "SELECT CAST(COUNT(*) AS INTEGER) AS total FROM customer c WHERE 1 = 1",
        );
        let mut params = Vec::new();
        Conditions {
            sql: &mut sql,
            params: &mut params,
        }
        .dates(filter, "c.created_at");

        let row = CountRow::find_by_statement(statement(&sql, params))
            .one(&self.db)
            .await?;
        Ok(row.map_or(0, |r| r.total.max(0) as u64))
    }

    async fn line_items(&self, filter: &RecordFilter) -> Result<Vec<LineItemRecord>> {
        let mut sql = String::from(
            r#"
            SELECT
                li.order_id,
                li.created_at,
                li.variant_id,
                li.variant_title,
                CAST(li.quantity AS INTEGER)    AS quantity
            FROM line_item li
            JOIN "order" o ON o.id = li.order_id
            WHERE 1 = 1
        "#,
        );
        let mut params = Vec::new();
        let mut conditions = Conditions {
            sql: &mut sql,
            params: &mut params,
        };
        conditions.dates(filter, "li.created_at");
        conditions.order(filter, "o");
        sql.push_str(" ORDER BY li.created_at");

        let rows = LineItemRow::find_by_statement(statement(&sql, params))
            .all(&self.db)
            .await?;
        tracing::debug!("Analytics: fetched {} line items", rows.len());

        rows.into_iter()
            .map(|row| {
                Ok(LineItemRecord {
                    created_at: parse_timestamp(&row.created_at)?,
                    order_id: row.order_id,
                    variant_id: row.variant_id,
                    variant_title: row.variant_title,
                    quantity: row.quantity.max(0) as u64,
                })
            })
            .collect()
    }

    async fn earliest_line_item(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut sql = String::from(
            r#"
            SELECT MIN(li.created_at) AS earliest
            FROM line_item li
            JOIN "order" o ON o.id = li.order_id
            WHERE 1 = 1
        "#,
        );
        let mut params = Vec::new();
        let mut conditions = Conditions {
            sql: &mut sql,
            params: &mut params,
        };
        conditions.dates(filter, "li.created_at");
        conditions.order(filter, "o");
        self.earliest(sql, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::ensure_host_schema;
    use chrono::TimeZone;
    use sea_orm::{ConnectOptions, ConnectionTrait, Database};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    async fn seeded() -> SeaOrmSource {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options).await.unwrap();
        ensure_host_schema(&db).await.unwrap();

        let orders = [
            ("o1", at(1, 10), "c1", "completed", "usd", 10.5, Some("pp_stripe")),
            ("o2", at(2, 10), "c2", "pending", "USD", 20.0, None),
            ("o3", at(3, 10), "c1", "canceled", "usd", 99.0, None),
            ("o4", at(4, 10), "c3", "completed", "eur", 5.0, None),
        ];
        for (id, created_at, customer, status, currency, total, provider) in orders {
            db.execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                r#"INSERT INTO "order" (id, created_at, customer_id, status, currency_code, total, payment_provider_id)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                [
                    id.into(),
                    format_timestamp(created_at).into(),
                    customer.into(),
                    status.into(),
                    currency.into(),
                    total.into(),
                    provider.map(str::to_string).into(),
                ],
            ))
            .await
            .unwrap();
        }
        for (order, code) in [("o1", "SPRING"), ("o1", "VIP")] {
            db.execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO order_discount (order_id, code) VALUES (?, ?)",
                [order.into(), code.into()],
            ))
            .await
            .unwrap();
        }
        for (id, created_at, has_account) in [("c1", at(1, 8), 1), ("c2", at(2, 8), 0), ("c3", at(5, 8), 1)] {
            db.execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO customer (id, created_at, has_account) VALUES (?, ?, ?)",
                [id.into(), format_timestamp(created_at).into(), (has_account as i32).into()],
            ))
            .await
            .unwrap();
        }
        for (id, order, created_at, variant, quantity) in [
            ("li1", "o1", at(1, 10), "v1", 2),
            ("li2", "o2", at(2, 10), "v2", 1),
            ("li3", "o3", at(3, 10), "v1", 7),
        ] {
            db.execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO line_item (id, order_id, created_at, variant_id, quantity) VALUES (?, ?, ?, ?, ?)",
                [
                    id.into(),
                    order.into(),
                    format_timestamp(created_at).into(),
                    variant.into(),
                    (quantity as i32).into(),
                ],
            ))
            .await
            .unwrap();
        }
        SeaOrmSource::new(db)
    }

    fn placed() -> RecordFilter {
        RecordFilter::statuses(&["pending".to_string(), "completed".to_string()])
    }

    #[tokio::test]
    async fn orders_respect_status_currency_and_dates() {
        let source = seeded().await;

        let all = source.orders(&placed()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2", "o4"]);
        assert_eq!(all[0].discount_codes, vec!["SPRING", "VIP"]);
        assert_eq!(all[0].payment_provider_id.as_deref(), Some("pp_stripe"));
        assert!(all[1].discount_codes.is_empty());

        let usd = source
            .orders(&placed().with_currency(Some("usd")))
            .await
            .unwrap();
        assert_eq!(usd.len(), 2);

        let windowed = source
            .orders(&placed().between(at(2, 0), at(4, 10)))
            .await
            .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id, "o2");
    }

    #[tokio::test]
    async fn earliest_and_counts() {
        let source = seeded().await;

        assert_eq!(source.earliest_order(&placed()).await.unwrap(), Some(at(1, 10)));
        assert_eq!(
            source
                .earliest_order(&placed().with_currency(Some("eur")))
                .await
                .unwrap(),
            Some(at(4, 10))
        );
        assert_eq!(
            source
                .earliest_order(&placed().with_currency(Some("gbp")))
                .await
                .unwrap(),
            None
        );

        assert_eq!(
            source.earliest_customer(&RecordFilter::default()).await.unwrap(),
            Some(at(1, 8))
        );
        assert_eq!(
            source.count_customers(&RecordFilter::default()).await.unwrap(),
            3
        );
        assert_eq!(
            source
                .count_customers(&RecordFilter::default().before(at(5, 0)))
                .await
                .unwrap(),
            2
        );

        let customers = source.customers(&RecordFilter::default()).await.unwrap();
        assert!(customers[0].has_account);
        assert!(!customers[1].has_account);
    }

    #[tokio::test]
    async fn line_items_follow_their_order() {
        let source = seeded().await;

        let items = source.line_items(&placed()).await.unwrap();
        let variants: Vec<(&str, u64)> = items
            .iter()
            .map(|li| (li.variant_id.as_str(), li.quantity))
            .collect();
        assert_eq!(variants, vec![("v1", 2), ("v2", 1)]);
        assert_eq!(
            source.earliest_line_item(&placed()).await.unwrap(),
            Some(at(1, 10))
        );
    }
}
