use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

/// Days added to the order date when the customer does not pick a shipping date.
pub const DEFAULT_SHIPPING_DELAY_DAYS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Re-applying the current status is always allowed so that repeated
    /// requests are harmless.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::InvalidRequest(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

// ── Collaborator views ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
}

/// Price and identity of a catalog product at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub price: BigDecimal,
}

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i32,
}

/// Everything a customer submits when placing an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRequest {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    /// Total computed by the client. Only checked against the server total.
    pub total_money: Option<BigDecimal>,
    pub shipping_method: String,
    pub shipping_address: String,
    pub shipping_date: Option<NaiveDate>,
    pub payment_method: String,
    pub cart_items: Vec<CartLine>,
}

/// Administrative correction of an existing order. Line items and pricing
/// are never touched through this path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderUpdate {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub shipping_method: String,
    pub shipping_address: String,
    pub shipping_date: Option<NaiveDate>,
    pub payment_method: String,
    pub status: Option<OrderStatus>,
}

// ── Aggregate ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderDetail {
    pub product_id: i64,
    pub price: BigDecimal,
    pub quantity: i32,
    pub total_money: BigDecimal,
}

impl NewOrderDetail {
    /// Snapshot the product's current price for `quantity` units.
    pub fn priced(product: &ProductSnapshot, quantity: i32) -> Self {
        let total_money = &product.price * BigDecimal::from(quantity);
        Self {
            product_id: product.id,
            price: product.price.clone(),
            quantity,
            total_money,
        }
    }
}

/// An order assembled in memory, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub total_money: BigDecimal,
    pub shipping_method: String,
    pub shipping_address: String,
    pub shipping_date: NaiveDate,
    pub payment_method: String,
    pub status: OrderStatus,
    pub active: bool,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub price: BigDecimal,
    pub quantity: i32,
    pub total_money: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub total_money: BigDecimal,
    pub shipping_method: String,
    pub shipping_address: String,
    pub shipping_date: NaiveDate,
    pub payment_method: String,
    pub status: OrderStatus,
    pub active: bool,
    pub order_date: DateTime<Utc>,
    pub details: Vec<OrderDetail>,
}

impl Order {
    /// Overwrite the mutable contact and commercial fields from `update`.
    ///
    /// `id`, `order_date`, `total_money`, `active` and the line items are
    /// left alone; status and shipping date are only replaced when given.
    pub fn apply_update(&mut self, update: &OrderUpdate) {
        self.user_id = update.user_id;
        self.full_name = update.full_name.clone();
        self.email = update.email.clone();
        self.phone_number = update.phone_number.clone();
        self.address = update.address.clone();
        self.note = update.note.clone();
        self.shipping_method = update.shipping_method.clone();
        self.shipping_address = update.shipping_address.clone();
        self.payment_method = update.payment_method.clone();
        if let Some(date) = update.shipping_date {
            self.shipping_date = date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }

    pub fn lines_total(&self) -> BigDecimal {
        self.details
            .iter()
            .fold(BigDecimal::from(0), |acc, d| acc + &d.total_money)
    }
}
