use contracts::shared::indicators::*;

/// Well-known indicator IDs (constants to avoid typos).
pub mod ids {
    use super::*;

    pub fn orders_count() -> IndicatorId {
        IndicatorId::new("orders_count")
    }
    pub fn sales_total() -> IndicatorId {
        IndicatorId::new("sales_total")
    }
    pub fn new_customers() -> IndicatorId {
        IndicatorId::new("new_customers")
    }
    pub fn repeat_customer_rate() -> IndicatorId {
        IndicatorId::new("repeat_customer_rate")
    }
    pub fn retention_rate() -> IndicatorId {
        IndicatorId::new("retention_rate")
    }

    /// Every registered indicator, in display order.
    pub fn all() -> Vec<IndicatorId> {
        vec![
            orders_count(),
            sales_total(),
            new_customers(),
            repeat_customer_rate(),
            retention_rate(),
        ]
    }
}

/// Build the full catalogue of indicators + sets.
pub fn build_catalog() -> IndicatorCatalogResponse {
    let indicators = vec![
        IndicatorMeta {
            id: ids::orders_count(),
            label: "Orders".into(),
            short_label: None,
            icon: "orders".into(),
            format: ValueFormat::Integer,
            description: Some("Placed orders in the period".into()),
        },
        IndicatorMeta {
            id: ids::sales_total(),
            label: "Sales".into(),
            short_label: None,
            icon: "dollar-sign".into(),
            format: ValueFormat::Number { decimals: 2 },
            description: Some("Sum of order totals in the requested currency".into()),
        },
        IndicatorMeta {
            id: ids::new_customers(),
            label: "New customers".into(),
            short_label: Some("New".into()),
            icon: "user-plus".into(),
            format: ValueFormat::Integer,
            description: Some("Customers registered in the period".into()),
        },
        IndicatorMeta {
            id: ids::repeat_customer_rate(),
            label: "Repeat customer rate".into(),
            short_label: Some("Repeat".into()),
            icon: "repeat".into(),
            format: ValueFormat::Percent { decimals: 2 },
            description: Some(
                "Customers with more than one order / customers who ordered in the period".into(),
            ),
        },
        IndicatorMeta {
            id: ids::retention_rate(),
            label: "Retention rate".into(),
            short_label: Some("Retention".into()),
            icon: "users".into(),
            format: ValueFormat::Percent { decimals: 2 },
            description: Some("Customers who ordered in the period / all customers".into()),
        },
    ];

    let sets = vec![
        IndicatorSetMeta {
            id: IndicatorSetId::new("store_overview"),
            label: "Store overview".into(),
            indicators: vec![ids::orders_count(), ids::sales_total(), ids::new_customers()],
            columns: 3,
        },
        IndicatorSetMeta {
            id: IndicatorSetId::new("customer_loyalty"),
            label: "Customer loyalty".into(),
            indicators: vec![ids::repeat_customer_rate(), ids::retention_rate()],
            columns: 2,
        },
    ];

    IndicatorCatalogResponse { indicators, sets }
}
