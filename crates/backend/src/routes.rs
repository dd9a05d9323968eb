use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DASHBOARDS (d410-d419)
        // ========================================
        .route(
            "/api/analytics/orders",
            get(handlers::d410_orders::get_orders_dashboard),
        )
        .route(
            "/api/analytics/sales",
            get(handlers::d411_sales::get_sales_dashboard),
        )
        .route(
            "/api/analytics/customers",
            get(handlers::d412_customers::get_customers_dashboard),
        )
        .route(
            "/api/analytics/products",
            get(handlers::d413_products::get_products_dashboard),
        )
        .route(
            "/api/analytics/marketing",
            get(handlers::d414_marketing::get_marketing_dashboard),
        )
        .route("/api/analytics/report", get(handlers::d419_report::get_report))
        .route(
            "/api/analytics/report.csv",
            get(handlers::d419_report::get_report_csv),
        )
        // ========================================
        // INDICATORS
        // ========================================
        .route(
            "/api/analytics/indicators/compute",
            post(handlers::indicators::compute_indicators),
        )
        .route(
            "/api/analytics/indicators/meta",
            get(handlers::indicators::get_indicator_catalog),
        )
}
