//! Macro-generated test suite for `OrderRepository` contract validation.
//!
//! # Generated Tests
//!
//! ## Add & Get
//! - `test_add_and_get` - add then retrieve, verify fields and items
//! - `test_get_nonexistent` - unknown id returns None
//! - `test_add_duplicate_id` - second add with same id is `AlreadyExists`
//! - `test_add_order_without_items` - empty orders are stored with a zero total
//! - `test_add_returns_stored_form` - sub-microsecond timestamps come back as stored
//!
//! ## Update
//! - `test_update_persists_status_and_bumps_version`
//! - `test_update_replaces_items_and_total`
//! - `test_update_stale_version_conflicts`
//! - `test_update_nonexistent`
//!
//! ## List
//! - `test_list_empty`
//! - `test_list_all_sorted_by_created_at`
//! - `test_list_by_status`
//!
//! ## Concurrency
//! - `test_concurrent_updates_single_winner` - racing writers on one version

/// Generate a full `OrderRepository` conformance test suite.
///
/// `$factory` must be an expression producing a fresh, empty repository. It
/// is re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! order_repository_tests {
    ($factory:expr) => {
        mod order_repository_contract_tests {
            use super::*;
            use cafe_orders::core::{CafeError, OrderError, OrderRepository, OrderStatus};
            use std::sync::Arc;
            use uuid::Uuid;

            // ==================================================================
            // Add & Get
            // ==================================================================

            #[tokio::test]
            async fn test_add_and_get() {
                let repository = $factory;
                let order = order_with_items(
                    "Alice",
                    day(2024, 3, 1),
                    &[("Latte", 450), ("Croissant", 300)],
                );

                let added = repository.add(order.clone()).await.unwrap();
                assert_same_order(&added, &order);
                assert_eq!(added.version, 1);

                let retrieved = repository.get_by_id(&order.id()).await.unwrap();
                let retrieved = retrieved.expect("order should exist after add");
                assert_same_order(&retrieved, &order);
                assert_eq!(retrieved.total_amount(), price(750));
                assert_eq!(retrieved.status, OrderStatus::InProgress);
                assert_eq!(retrieved.version, 1);
                assert!(retrieved.items().iter().all(|i| i.order_id == order.id()));
            }

            #[tokio::test]
            async fn test_add_returns_stored_form() {
                let repository = $factory;
                let created_at = day(2024, 3, 1) + chrono::Duration::nanoseconds(123_456_789);
                let order = order_with_items("Alice", created_at, &[("Mocha", 525)]);

                let added = repository.add(order).await.unwrap();
                let stored = repository.get_by_id(&added.id()).await.unwrap();
                let stored = stored.expect("order should exist after add");

                assert_same_order(&added, &stored);
                assert_eq!(added.version, stored.version);
                assert_eq!(added, stored);
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let repository = $factory;

                let result = repository.get_by_id(&Uuid::new_v4()).await.unwrap();
                assert!(result.is_none(), "unknown id should return None");
            }

            #[tokio::test]
            async fn test_add_duplicate_id() {
                let repository = $factory;
                let order = sample_order(OrderStatus::InProgress, day(2024, 3, 1));

                repository.add(order.clone()).await.unwrap();
                let err = repository.add(order.clone()).await.unwrap_err();

                assert!(
                    matches!(
                        err,
                        CafeError::Order(OrderError::AlreadyExists { id }) if id == order.id()
                    ),
                    "unexpected error: {:?}",
                    err
                );
                assert_count(&repository.list_by_status(None).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_add_order_without_items() {
                let repository = $factory;
                let order = order_with_items("Bob", day(2024, 3, 1), &[]);

                repository.add(order.clone()).await.unwrap();

                let retrieved = repository.get_by_id(&order.id()).await.unwrap().unwrap();
                assert!(retrieved.items().is_empty());
                assert_eq!(retrieved.total_amount(), price(0));
            }

            // ==================================================================
            // Update
            // ==================================================================

            #[tokio::test]
            async fn test_update_persists_status_and_bumps_version() {
                let repository = $factory;
                let mut order = repository
                    .add(sample_order(OrderStatus::InProgress, day(2024, 3, 1)))
                    .await
                    .unwrap();

                order.status = OrderStatus::Completed;
                let updated = repository.update(order.clone()).await.unwrap();
                assert_eq!(updated.status, OrderStatus::Completed);
                assert_eq!(updated.version, 2);

                let stored = repository.get_by_id(&order.id()).await.unwrap().unwrap();
                assert_eq!(stored.status, OrderStatus::Completed);
                assert_eq!(stored.version, 2);
                assert_eq!(stored.items().len(), 1, "items survive a status change");
            }

            #[tokio::test]
            async fn test_update_replaces_items_and_total() {
                let repository = $factory;
                let mut order = repository
                    .add(order_with_items("Carol", day(2024, 3, 1), &[("Tea", 200)]))
                    .await
                    .unwrap();

                let extra =
                    order_with_items("Carol", day(2024, 3, 1), &[("Tea", 200), ("Scone", 350)]);
                order.replace_items(extra.items().to_vec());
                repository.update(order.clone()).await.unwrap();

                let stored = repository.get_by_id(&order.id()).await.unwrap().unwrap();
                let names: Vec<&str> =
                    stored.items().iter().map(|i| i.item_name.as_str()).collect();
                assert_eq!(names, vec!["Tea", "Scone"]);
                assert_eq!(stored.total_amount(), price(550));
            }

            #[tokio::test]
            async fn test_update_stale_version_conflicts() {
                let repository = $factory;
                let loaded = repository
                    .add(sample_order(OrderStatus::InProgress, day(2024, 3, 1)))
                    .await
                    .unwrap();

                let mut first = loaded.clone();
                first.status = OrderStatus::Completed;
                repository.update(first).await.unwrap();

                let mut stale = loaded.clone();
                stale.status = OrderStatus::Canceled;
                let err = repository.update(stale).await.unwrap_err();

                assert!(
                    matches!(err, CafeError::Order(OrderError::Conflict { .. })),
                    "unexpected error: {:?}",
                    err
                );
                let stored = repository.get_by_id(&loaded.id()).await.unwrap().unwrap();
                assert_eq!(stored.status, OrderStatus::Completed);
                assert_eq!(stored.version, 2);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let repository = $factory;
                let order = sample_order(OrderStatus::InProgress, day(2024, 3, 1));

                let err = repository.update(order.clone()).await.unwrap_err();

                assert!(
                    matches!(
                        err,
                        CafeError::Order(OrderError::NotFound { id }) if id == order.id()
                    ),
                    "unexpected error: {:?}",
                    err
                );
                assert!(repository.get_by_id(&order.id()).await.unwrap().is_none());
            }

            // ==================================================================
            // List
            // ==================================================================

            #[tokio::test]
            async fn test_list_empty() {
                let repository = $factory;

                assert!(repository.list_by_status(None).await.unwrap().is_empty());
                assert!(repository
                    .list_by_status(Some(OrderStatus::Completed))
                    .await
                    .unwrap()
                    .is_empty());
            }

            #[tokio::test]
            async fn test_list_all_sorted_by_created_at() {
                let repository = $factory;
                let late = sample_order(OrderStatus::InProgress, day(2024, 5, 1));
                let early = sample_order(OrderStatus::Completed, day(2024, 1, 1));
                let middle = sample_order(OrderStatus::Canceled, day(2024, 3, 1));

                for order in [&late, &early, &middle] {
                    repository.add(order.clone()).await.unwrap();
                }

                let all = repository.list_by_status(None).await.unwrap();
                let ids: Vec<Uuid> = all.iter().map(|o| o.id()).collect();
                assert_eq!(ids, vec![early.id(), middle.id(), late.id()]);
                assert!(all.iter().all(|o| !o.items().is_empty()), "lists include items");
            }

            #[tokio::test]
            async fn test_list_by_status() {
                let repository = $factory;
                repository
                    .add(sample_order(OrderStatus::InProgress, day(2024, 1, 1)))
                    .await
                    .unwrap();
                repository
                    .add(sample_order(OrderStatus::Completed, day(2024, 1, 2)))
                    .await
                    .unwrap();
                repository
                    .add(sample_order(OrderStatus::Completed, day(2024, 1, 3)))
                    .await
                    .unwrap();

                let completed = repository
                    .list_by_status(Some(OrderStatus::Completed))
                    .await
                    .unwrap();
                assert_count(&completed, 2);
                assert!(completed.iter().all(|o| o.status == OrderStatus::Completed));

                let canceled = repository
                    .list_by_status(Some(OrderStatus::Canceled))
                    .await
                    .unwrap();
                assert!(canceled.is_empty());
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_updates_single_winner() {
                let repository = Arc::new($factory);
                let loaded = repository
                    .add(sample_order(OrderStatus::InProgress, day(2024, 3, 1)))
                    .await
                    .unwrap();

                let mut handles = Vec::new();
                for status in [OrderStatus::Completed, OrderStatus::Canceled] {
                    let repository = Arc::clone(&repository);
                    let mut candidate = loaded.clone();
                    candidate.status = status;
                    handles.push(tokio::spawn(async move { repository.update(candidate).await }));
                }

                let mut successes = 0;
                let mut conflicts = 0;
                for handle in handles {
                    match handle.await.unwrap() {
                        Ok(_) => successes += 1,
                        Err(CafeError::Order(OrderError::Conflict { .. })) => conflicts += 1,
                        Err(other) => panic!("unexpected error: {:?}", other),
                    }
                }

                assert_eq!(successes, 1, "exactly one writer wins");
                assert_eq!(conflicts, 1, "the other sees a version conflict");

                let stored = repository.get_by_id(&loaded.id()).await.unwrap().unwrap();
                assert_eq!(stored.version, 2);
            }
        }
    };
}
