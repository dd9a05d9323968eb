use chrono::{DateTime, Utc};

use super::partition::Timestamped;

/// An order row as read from the host platform.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer_id: String,
    pub status: String,
    pub currency_code: String,
    /// Order total in the order currency.
    pub total: f64,
    pub region_id: Option<String>,
    pub sales_channel_id: Option<String>,
    pub payment_provider_id: Option<String>,
    pub discount_codes: Vec<String>,
}

/// A customer row.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub has_account: bool,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemRecord {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub variant_id: String,
    pub variant_title: Option<String>,
    pub quantity: u64,
}

impl Timestamped for OrderRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for CustomerRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for LineItemRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
