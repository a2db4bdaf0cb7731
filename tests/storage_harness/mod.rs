//! Shared test harness for order repository backends
//!
//! Provides order builders and two macros:
//! - `order_repository_tests!` checks any `OrderRepository` against the
//!   persistence contract
//! - `order_api_tests!` drives the same backend through the HTTP API
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! order_repository_tests!(InMemoryOrderRepository::new());
//! order_api_tests!(InMemoryOrderRepository::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod order_repository_tests;


use cafe_orders::core::{Order, OrderItem, OrderStatus};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Price from an amount in cents
pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Midnight UTC on the given day
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

/// Build an order with the given items `(name, cents)`.
///
/// Timestamps are whole seconds so every backend stores them exactly.
pub fn order_with_items(
    customer: &str,
    created_at: DateTime<Utc>,
    items: &[(&str, i64)],
) -> Order {
    let id = Uuid::new_v4();
    let items = items
        .iter()
        .map(|(name, cents)| OrderItem {
            id: Uuid::new_v4(),
            order_id: id,
            item_name: name.to_string(),
            price: price(*cents),
        })
        .collect();

    Order::new(id, customer, "Card", created_at, items)
}

/// A single-item order in the given status
pub fn sample_order(status: OrderStatus, created_at: DateTime<Utc>) -> Order {
    let mut order = order_with_items("Jane", created_at, &[("Espresso", 250)]);
    order.status = status;
    order
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

/// Compare the persisted fields of two orders
pub fn assert_same_order(actual: &Order, expected: &Order) {
    assert_eq!(actual.id(), expected.id());
    assert_eq!(actual.customer_name, expected.customer_name);
    assert_eq!(actual.payment_method, expected.payment_method);
    assert_eq!(actual.created_at, expected.created_at);
    assert_eq!(actual.status, expected.status);
    assert_eq!(actual.total_amount(), expected.total_amount());

    let actual_items: Vec<(&str, Decimal)> = actual
        .items()
        .iter()
        .map(|i| (i.item_name.as_str(), i.price))
        .collect();
    let expected_items: Vec<(&str, Decimal)> = expected
        .items()
        .iter()
        .map(|i| (i.item_name.as_str(), i.price))
        .collect();
    assert_eq!(actual_items, expected_items);
}
