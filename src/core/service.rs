//! Order service: business rules above the repository
//!
//! The service validates creation input, forces the initial status, derives
//! totals, enforces the status lifecycle and applies time-range filtering. It
//! depends only on [`OrderRepository`], never on a concrete store.

use crate::core::error::{CafeError, CafeResult, OrderError};
use crate::core::order::{NewOrder, Order, OrderStatus};
use crate::core::query::OrderFilter;
use crate::core::repository::OrderRepository;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    /// Convenience constructor taking a repository by value
    pub fn with_repository(repository: impl OrderRepository + 'static) -> Self {
        Self::new(Arc::new(repository))
    }

    pub fn repository(&self) -> &Arc<dyn OrderRepository> {
        &self.repository
    }

    /// Create an order
    ///
    /// The stored order is always `InProgress`, whatever status the caller
    /// sent, and its total is recomputed from the items.
    pub async fn create_order(&self, input: NewOrder) -> CafeResult<Order> {
        let input = input.validated()?;
        if let Some(requested) = &input.status {
            tracing::debug!(requested = %requested, "ignoring caller status on create");
        }

        let mut order = input.into_order(Utc::now());
        order.status = OrderStatus::InProgress;
        order.recalculate_total();

        let created = self.repository.add(order).await?;

        tracing::info!(
            order_id = %created.id(),
            items = created.items().len(),
            total = %created.total_amount(),
            "order created"
        );
        Ok(created)
    }

    /// Get an order by ID, failing with `NotFound` when absent
    pub async fn get_order(&self, id: Uuid) -> CafeResult<Order> {
        self.repository
            .get_by_id(&id)
            .await?
            .ok_or_else(|| OrderError::NotFound { id }.into())
    }

    /// Move an order to `status`
    ///
    /// `Completed -> Canceled` and `Canceled -> Completed` fail with
    /// `InvalidTransition` and leave the order untouched.
    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> CafeResult<Order> {
        let mut order = self.get_order(id).await?;
        let current = order.status;

        if !current.can_transition_to(status) {
            tracing::warn!(
                order_id = %id,
                from = %current,
                to = %status,
                "rejected status transition"
            );
            return Err(OrderError::InvalidTransition {
                id,
                from: current,
                to: status,
            }
            .into());
        }

        order.status = status;
        let updated = self.repository.update(order).await.inspect_err(|e| {
            if matches!(e, CafeError::Order(OrderError::Conflict { .. })) {
                tracing::warn!(order_id = %id, "status update lost a concurrent write race");
            }
        })?;

        tracing::info!(order_id = %id, from = %current, to = %status, "order status updated");
        Ok(updated)
    }

    /// List orders matching the status filter and time bounds
    pub async fn list_orders(&self, filter: &OrderFilter) -> CafeResult<Vec<Order>> {
        let orders = self.repository.list_by_status(filter.status).await?;

        let orders: Vec<Order> = if filter.has_time_bounds() {
            orders
                .into_iter()
                .filter(|order| filter.matches_time(order))
                .collect()
        } else {
            orders
        };

        tracing::debug!(
            status = ?filter.status,
            from = ?filter.lower_bound(),
            to = ?filter.upper_bound(),
            count = orders.len(),
            "listed orders"
        );
        Ok(orders)
    }
}
