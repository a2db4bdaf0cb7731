//! Core module: order model, business rules and the persistence contract

pub mod error;
pub mod order;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{
    CafeError, CafeResult, ConfigError, ErrorResponse, OrderError, StorageError, ValidationError,
};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};
pub use query::{ListOrdersParams, OrderFilter};
pub use repository::OrderRepository;
pub use service::OrderService;
