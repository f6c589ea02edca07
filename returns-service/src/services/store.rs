//! Order and product store seams. The host shop is an external system; these
//! traits are the only surface the handlers touch, and the in-memory
//! implementation backs the binary (optionally seeded from a JSON fixture)
//! and the tests.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::models::order::{Order, Product};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Resolve the secret order key to an order id.
    async fn order_id_by_key(&self, order_key: &str) -> Result<Option<u64>, StoreError>;

    async fn order(&self, order_id: u64) -> Result<Option<Order>, StoreError>;

    /// Overwrite one metadata entry on a line item. Last write wins; no
    /// history is kept.
    async fn update_item_meta(
        &self,
        order_id: u64,
        item_id: u64,
        key: &str,
        value: String,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn product(&self, product_id: u64) -> Result<Option<Product>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryStore {
    orders: RwLock<HashMap<u64, Order>>,
    products: RwLock<HashMap<u64, Product>>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    products: Vec<Product>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON fixture of the shape
    /// `{ "orders": [...], "products": [...] }`.
    pub fn from_fixture_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        let store = Self::new();
        for order in fixture.orders {
            store.insert_order(order);
        }
        for product in fixture.products {
            store.insert_product(product);
        }
        Ok(store)
    }

    pub fn insert_order(&self, order: Order) {
        self.write_orders().insert(order.id, order);
    }

    pub fn insert_product(&self, product: Product) {
        self.products
            .write()
            .expect("products lock poisoned")
            .insert(product.id, product);
    }

    /// Direct read of one item-meta entry, for inspection in tests.
    pub fn item_meta(&self, order_id: u64, item_id: u64, key: &str) -> Option<String> {
        self.read_orders()
            .get(&order_id)
            .and_then(|order| order.item(item_id))
            .and_then(|item| item.meta.get(key).cloned())
    }

    fn read_orders(&self) -> RwLockReadGuard<'_, HashMap<u64, Order>> {
        self.orders.read().expect("orders lock poisoned")
    }

    fn write_orders(&self) -> RwLockWriteGuard<'_, HashMap<u64, Order>> {
        self.orders.write().expect("orders lock poisoned")
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn order_id_by_key(&self, order_key: &str) -> Result<Option<u64>, StoreError> {
        Ok(self
            .read_orders()
            .values()
            .find(|order| order.order_key == order_key)
            .map(|order| order.id))
    }

    async fn order(&self, order_id: u64) -> Result<Option<Order>, StoreError> {
        Ok(self.read_orders().get(&order_id).cloned())
    }

    async fn update_item_meta(
        &self,
        order_id: u64,
        item_id: u64,
        key: &str,
        value: String,
    ) -> Result<(), StoreError> {
        let mut orders = self.write_orders();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::Backend(format!("unknown order {}", order_id)))?;
        let item = order
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                StoreError::Backend(format!("unknown item {} on order {}", item_id, order_id))
            })?;
        item.meta.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn product(&self, product_id: u64) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products
            .read()
            .expect("products lock poisoned")
            .get(&product_id)
            .cloned())
    }
}
