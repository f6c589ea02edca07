use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Order lifecycle status. Only completed orders accept return/exchange
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        };
        f.write_str(label)
    }
}

/// One product-quantity entry within an order, carrying an arbitrary
/// key/value metadata bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub product_id: u64,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Opaque secret permitting unauthenticated customer lookup.
    pub order_key: String,
    pub status: OrderStatus,
    pub billing_email: String,
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn item(&self, item_id: u64) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Customer-facing view URL with the order key attached.
    pub fn view_url(&self) -> String {
        format!("/orders/{}?key={}", self.id, self.order_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
