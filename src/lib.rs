//! # Cafe Orders
//!
//! Order management backend for a café: customers place orders made of
//! line items, staff move them through `InProgress`, `Completed` and
//! `Canceled`, and managers list them by status and creation time.
//!
//! ## Features
//!
//! - **Order lifecycle**: orders always start `InProgress`; `Completed` and
//!   `Canceled` can never be swapped for one another
//! - **Derived totals**: `total_amount` is the sum of item prices, recomputed on every write
//! - **Pluggable storage**: in-memory by default, PostgreSQL with the `postgres` feature
//! - **Optimistic concurrency**: each write bumps a `version`, stale writes are rejected
//! - **REST API**: axum router with structured JSON errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cafe_orders::prelude::*;
//!
//! let service = OrderService::with_repository(InMemoryOrderRepository::new());
//!
//! let order = service
//!     .create_order(
//!         NewOrder::new("Jane", "Card")
//!             .with_item("Latte", Decimal::new(450, 2))
//!             .with_item("Croissant", Decimal::new(300, 2)),
//!     )
//!     .await?;
//!
//! service.update_order_status(order.id(), OrderStatus::Completed).await?;
//!
//! // Or expose it over HTTP
//! ServerBuilder::new()
//!     .with_repository(InMemoryOrderRepository::new())
//!     .serve("127.0.0.1:8080")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        CafeError, CafeResult, ConfigError, ListOrdersParams, NewOrder, NewOrderItem, Order,
        OrderError, OrderFilter, OrderItem, OrderRepository, OrderService, OrderStatus,
        StorageError, ValidationError,
    };

    // === Storage ===
    pub use crate::storage::InMemoryOrderRepository;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresOrderRepository;

    // === Config ===
    pub use crate::config::{AppConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
