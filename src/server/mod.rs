//! HTTP server for the order API
//!
//! This module provides a `ServerBuilder` that wires an [`OrderRepository`]
//! into the order routes, health checks and request tracing.
//!
//! [`OrderRepository`]: crate::core::OrderRepository

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::{AppState, StatusUpdateRequest};
pub use router::build_router;
