//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresOrderRepository`, an [`OrderRepository`] backed by a
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! cafe-orders = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Orders live in `orders`, their line items in `order_items` with
//! `ON DELETE CASCADE` on the parent key. Item order is kept in a `position`
//! column. `add` and `update` each run in a single transaction, so an order
//! is never visible without its items.

use crate::core::error::{CafeResult, OrderError, StorageError};
use crate::core::order::{Order, OrderItem, OrderStatus};
use crate::core::repository::OrderRepository;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Apply pending migrations from `migrations/` (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> CafeResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StorageError::QueryError {
            backend: "PostgreSQL".to_string(),
            message: format!("failed to apply migrations: {}", e),
        })?;

    Ok(())
}

/// Open a connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> CafeResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await
        .map_err(|e| {
            StorageError::ConnectionError {
                backend: "PostgreSQL".to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

fn transaction_error(e: sqlx::Error) -> StorageError {
    StorageError::TransactionError {
        message: e.to_string(),
    }
}

type OrderRow = (Uuid, String, String, DateTime<Utc>, String, i64);
type ItemRow = (Uuid, Uuid, String, Decimal);

const SELECT_ORDER: &str =
    "SELECT id, customer_name, payment_method, created_at, status, version FROM orders";
const SELECT_ITEMS: &str = "SELECT id, order_id, item_name, price FROM order_items";

/// Order repository backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// let pool = cafe_orders::storage::postgres::connect("postgres://localhost/cafe", 5).await?;
/// ensure_schema(&pool).await?;
/// let repository = PostgresOrderRepository::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn reconstruct(row: OrderRow, items: Vec<ItemRow>) -> CafeResult<Order> {
        let (id, customer_name, payment_method, created_at, status, version) = row;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| StorageError::IntegrityError {
                message: format!("order {}: {}", id, e),
            })?;

        let items = items
            .into_iter()
            .map(|(item_id, order_id, item_name, price)| OrderItem {
                id: item_id,
                order_id,
                item_name,
                price,
            })
            .collect();

        Ok(Order::restore(
            id,
            customer_name,
            payment_method,
            created_at,
            status,
            items,
            version,
        ))
    }

    async fn insert_items(tx: &mut Transaction<'_, Postgres>, order: &Order) -> CafeResult<()> {
        for (position, item) in order.items().iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, position, item_name, price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.id)
            .bind(order.id())
            .bind(position as i32)
            .bind(&item.item_name)
            .bind(item.price)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn items_for(&self, order_ids: &[Uuid]) -> CafeResult<HashMap<Uuid, Vec<ItemRow>>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "{} WHERE order_id = ANY($1) ORDER BY order_id, position",
            SELECT_ITEMS
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<ItemRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.1).or_default().push(row);
        }

        Ok(grouped)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn add(&self, mut order: Order) -> CafeResult<Order> {
        // TIMESTAMPTZ keeps microseconds
        order.created_at = order.created_at.trunc_subsecs(6);
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        let inserted = sqlx::query(
            "INSERT INTO orders \
             (id, customer_name, payment_method, created_at, status, total_amount, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (id) DO NOTHING",
        )
        .bind(order.id())
        .bind(&order.customer_name)
        .bind(&order.payment_method)
        .bind(order.created_at)
        .bind(order.status.as_str())
        .bind(order.total_amount())
        .bind(order.version)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await.map_err(transaction_error)?;
            return Err(OrderError::AlreadyExists { id: order.id() }.into());
        }

        Self::insert_items(&mut tx, &order).await?;
        tx.commit().await.map_err(transaction_error)?;

        Ok(order)
    }

    async fn get_by_id(&self, id: &Uuid) -> CafeResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE id = $1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ItemRow>(&format!(
            "{} WHERE order_id = $1 ORDER BY position",
            SELECT_ITEMS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Self::reconstruct(row, items).map(Some)
    }

    async fn update(&self, mut order: Order) -> CafeResult<Order> {
        order.recalculate_total();
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        let updated = sqlx::query(
            "UPDATE orders SET customer_name = $3, payment_method = $4, status = $5, \
             total_amount = $6, version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(order.id())
        .bind(order.version)
        .bind(&order.customer_name)
        .bind(&order.payment_method)
        .bind(order.status.as_str())
        .bind(order.total_amount())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM orders WHERE id = $1")
                .bind(order.id())
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await.map_err(transaction_error)?;

            return Err(match exists {
                Some(_) => OrderError::Conflict {
                    id: order.id(),
                    expected_version: order.version,
                },
                None => OrderError::NotFound { id: order.id() },
            }
            .into());
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id())
            .execute(&mut *tx)
            .await?;
        Self::insert_items(&mut tx, &order).await?;
        tx.commit().await.map_err(transaction_error)?;

        order.version += 1;
        Ok(order)
    }

    async fn list_by_status(&self, status: Option<OrderStatus>) -> CafeResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE ($1::text IS NULL OR status = $1) ORDER BY created_at, id",
            SELECT_ORDER
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.0).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.0).unwrap_or_default();
                Self::reconstruct(row, order_items)
            })
            .collect()
    }
}
