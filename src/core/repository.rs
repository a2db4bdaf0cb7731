//! Persistence contract consumed by the order service

use crate::core::error::CafeResult;
use crate::core::order::{Order, OrderStatus};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for order aggregates
///
/// Implementations persist an order together with its items as one unit and
/// always return orders with their items populated. The service is agnostic
/// to the backing store.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order with its items
    ///
    /// Fails with `OrderError::AlreadyExists` when the id is already taken.
    async fn add(&self, order: Order) -> CafeResult<Order>;

    /// Get an order by ID
    async fn get_by_id(&self, id: &Uuid) -> CafeResult<Option<Order>>;

    /// Persist the full current state of an existing order
    ///
    /// `order.version` must match the stored version, otherwise the call fails
    /// with `OrderError::Conflict` and nothing is written. The returned order
    /// carries the incremented version.
    async fn update(&self, order: Order) -> CafeResult<Order>;

    /// List orders with the given status, or all orders when `status` is `None`
    ///
    /// Results are ordered by creation time, oldest first.
    async fn list_by_status(&self, status: Option<OrderStatus>) -> CafeResult<Vec<Order>>;
}
