pub mod d410_orders;
pub mod d411_sales;
pub mod d412_customers;
pub mod d413_products;
pub mod d414_marketing;
pub mod d419_report;
