//! Order aggregate, its line items and the status lifecycle
//!
//! An [`Order`] owns its [`OrderItem`]s. The total amount is derived from the
//! item prices and cannot be assigned from outside this module; it is
//! recomputed every time the item set is finalized.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{FieldValidationError, ValidationError};

/// Lifecycle status of an order
///
/// Serialized as `"InProgress"`, `"Completed"` or `"Canceled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    InProgress,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    /// String form used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "InProgress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
        }
    }

    /// Whether an order in this status may move to `next`
    ///
    /// Every move is allowed except between the two terminal statuses:
    /// `Completed -> Canceled` and `Canceled -> Completed` are rejected.
    /// Re-applying the current status and returning to `InProgress` are fine.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        !matches!(
            (self, next),
            (OrderStatus::Completed, OrderStatus::Canceled)
                | (OrderStatus::Canceled, OrderStatus::Completed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus {
                value: s.to_string(),
            })
    }
}

/// A single priced line item belonging to exactly one order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: Uuid,

    /// Owning order; informational only and never serialized
    #[serde(skip)]
    pub order_id: Uuid,

    pub item_name: String,
    pub price: Decimal,
}

/// Order aggregate
///
/// The id is fixed at construction; there is no setter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    id: Uuid,
    pub customer_name: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    total_amount: Decimal,
    items: Vec<OrderItem>,

    /// Optimistic concurrency token, bumped by the repository on every update
    pub version: i64,
}

impl Order {
    /// Build a fresh `InProgress` order with version 1
    ///
    /// Items are re-parented onto `id` and the total is computed.
    pub fn new(
        id: Uuid,
        customer_name: impl Into<String>,
        payment_method: impl Into<String>,
        created_at: DateTime<Utc>,
        items: Vec<OrderItem>,
    ) -> Self {
        let mut order = Self {
            id,
            customer_name: customer_name.into(),
            payment_method: payment_method.into(),
            created_at,
            status: OrderStatus::InProgress,
            total_amount: Decimal::ZERO,
            items: Vec::new(),
            version: 1,
        };
        order.replace_items(items);
        order
    }

    /// Rebuild an order loaded from storage
    ///
    /// The stored total is ignored; it is derived from `items` like everywhere else.
    pub fn restore(
        id: Uuid,
        customer_name: String,
        payment_method: String,
        created_at: DateTime<Utc>,
        status: OrderStatus,
        items: Vec<OrderItem>,
        version: i64,
    ) -> Self {
        let mut order = Self::new(id, customer_name, payment_method, created_at, items);
        order.status = status;
        order.version = version;
        order
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Replace the item set, re-parent every item and recompute the total
    pub fn replace_items(&mut self, items: Vec<OrderItem>) {
        self.items = items
            .into_iter()
            .map(|mut item| {
                item.order_id = self.id;
                item
            })
            .collect();
        self.recalculate_total();
    }

    /// Recompute `total_amount` as the exact sum of item prices
    ///
    /// Saturates at `Decimal::MAX`; `NewOrder::validated` rejects item sets
    /// whose sum does not fit.
    pub fn recalculate_total(&mut self) {
        self.total_amount = checked_total(self.items.iter().map(|item| item.price))
            .unwrap_or(Decimal::MAX);
    }
}

/// Sum of `prices`, or `None` when it overflows `Decimal`
pub fn checked_total(prices: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    prices
        .into_iter()
        .try_fold(Decimal::ZERO, |total, price| total.checked_add(price))
}

// =============================================================================
// Creation input
// =============================================================================

/// Line item as submitted by a client
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewOrderItem {
    #[validate(length(min = 1, message = "item name must not be empty"))]
    pub item_name: String,

    #[validate(custom(function = "non_negative_price"))]
    pub price: Decimal,
}

/// Order as submitted by a client
///
/// `id` is honoured when present. `status` is accepted in any shape and
/// always replaced by `InProgress`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewOrder {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "customer name must not be empty"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "payment method must not be empty"))]
    pub payment_method: String,

    #[serde(default)]
    pub status: Option<serde_json::Value>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(customer_name: impl Into<String>, payment_method: impl Into<String>) -> Self {
        Self {
            id: None,
            customer_name: customer_name.into(),
            payment_method: payment_method.into(),
            status: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item_name: impl Into<String>, price: Decimal) -> Self {
        self.items.push(NewOrderItem {
            item_name: item_name.into(),
            price,
        });
        self
    }

    /// Trim surrounding whitespace from every text field
    pub fn normalized(mut self) -> Self {
        self.customer_name = self.customer_name.trim().to_string();
        self.payment_method = self.payment_method.trim().to_string();
        for item in &mut self.items {
            item.item_name = item.item_name.trim().to_string();
        }
        self
    }

    /// Normalize, then check every field
    ///
    /// All violations are reported at once, sorted by field path.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let order = self.normalized();
        let mut fields = Vec::new();

        if let Err(errors) = order.validate() {
            collect_field_errors("", &errors, &mut fields);
        }
        if checked_total(order.items.iter().map(|item| item.price)).is_none() {
            fields.push(FieldValidationError {
                field: "items".to_string(),
                message: "total amount is out of range".to_string(),
            });
        }

        if fields.is_empty() {
            return Ok(order);
        }
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Err(ValidationError::FieldErrors(fields))
    }

    /// Turn validated input into an order aggregate
    pub fn into_order(self, created_at: DateTime<Utc>) -> Order {
        let id = self.id.unwrap_or_else(Uuid::new_v4);
        let items = self
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id: id,
                item_name: item.item_name,
                price: item.price,
            })
            .collect();
        Order::new(id, self.customer_name, self.payment_method, created_at, items)
    }
}

fn non_negative_price(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = validator::ValidationError::new("non_negative");
        err.message = Some("price must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn collect_field_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<FieldValidationError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| FieldValidationError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect_field_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}
