//! In-memory implementation of OrderRepository for testing and development

use crate::core::error::{CafeResult, OrderError, StorageError};
use crate::core::order::{Order, OrderStatus};
use crate::core::repository::OrderRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory order repository
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// clones share the same underlying map.
#[derive(Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    /// Create a new, empty in-memory repository
    pub fn new() -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored orders
    pub fn len(&self) -> CafeResult<usize> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders.len())
    }

    pub fn is_empty(&self) -> CafeResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::LockPoisoned {
        message: e.to_string(),
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn add(&self, order: Order) -> CafeResult<Order> {
        let mut orders = self.orders.write().map_err(poisoned)?;

        if orders.contains_key(&order.id()) {
            return Err(OrderError::AlreadyExists { id: order.id() }.into());
        }

        orders.insert(order.id(), order.clone());

        Ok(order)
    }

    async fn get_by_id(&self, id: &Uuid) -> CafeResult<Option<Order>> {
        let orders = self.orders.read().map_err(poisoned)?;

        Ok(orders.get(id).cloned())
    }

    async fn update(&self, mut order: Order) -> CafeResult<Order> {
        let mut orders = self.orders.write().map_err(poisoned)?;

        let stored = orders
            .get(&order.id())
            .ok_or(OrderError::NotFound { id: order.id() })?;

        if stored.version != order.version {
            return Err(OrderError::Conflict {
                id: order.id(),
                expected_version: order.version,
            }
            .into());
        }

        order.version += 1;
        order.recalculate_total();
        orders.insert(order.id(), order.clone());

        Ok(order)
    }

    async fn list_by_status(&self, status: Option<OrderStatus>) -> CafeResult<Vec<Order>> {
        let orders = self.orders.read().map_err(poisoned)?;

        let mut matching: Vec<Order> = orders
            .values()
            .filter(|order| status.is_none_or(|s| order.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|order| order.created_at);

        Ok(matching)
    }
}
