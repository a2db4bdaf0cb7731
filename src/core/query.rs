//! Query parameters for listing orders

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::core::error::ValidationError;
use crate::core::order::{Order, OrderStatus};

/// Raw query string of `GET /orders`
///
/// All parameters are optional and empty values count as absent.
///
/// # Example
/// ```text
/// GET /orders?status=Completed
/// GET /orders?status=Completed&from=2023-01-15&to=2023-02-15T23:59:59Z
/// GET /orders?from=2024-03-01T08:00:00Z
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListOrdersParams {
    pub status: Option<String>,

    /// Inclusive lower bound on the creation time (RFC 3339 or `YYYY-MM-DD`)
    pub from: Option<String>,

    /// Inclusive upper bound on the creation time (RFC 3339 or `YYYY-MM-DD`)
    pub to: Option<String>,
}

impl ListOrdersParams {
    /// Parse into a typed filter
    pub fn into_filter(self) -> Result<OrderFilter, ValidationError> {
        let status = non_empty(self.status)
            .map(|s| s.parse::<OrderStatus>())
            .transpose()?;
        let from = non_empty(self.from)
            .map(|s| parse_timestamp("from", &s))
            .transpose()?;
        let to = non_empty(self.to)
            .map(|s| parse_timestamp("to", &s))
            .transpose()?;

        OrderFilter::new(status, from, to)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an RFC 3339 timestamp, or a bare date taken as midnight UTC
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::FieldError {
            field: field.to_string(),
            message: format!(
                "'{}' is not an RFC 3339 timestamp or a YYYY-MM-DD date",
                value
            ),
        })
}

/// Typed filter applied by `OrderService::list_orders`
///
/// Each time bound is applied on its own: `from` alone keeps orders created at
/// or after it, `to` alone keeps orders created at or before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Build a filter, rejecting `from > to`
    pub fn new(
        status: Option<OrderStatus>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::InvalidTimeRange {
                    from: from.to_rfc3339(),
                    to: to.to_rfc3339(),
                });
            }
        }

        Ok(Self { status, from, to })
    }

    /// No filtering at all
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn has_time_bounds(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Whether the order's creation time lies within the bounds, inclusive
    pub fn matches_time(&self, order: &Order) -> bool {
        self.from.is_none_or(|from| order.created_at >= from)
            && self.to.is_none_or(|to| order.created_at <= to)
    }
}
