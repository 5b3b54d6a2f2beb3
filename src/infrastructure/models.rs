use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    Account, NewOrder, NewOrderDetail, Order, OrderDetail, ProductSnapshot,
};
use crate::schema::{order_details, orders, products, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
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
    pub status: String,
    pub active: bool,
    pub order_date: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, details: Vec<OrderDetailRow>) -> Result<Order, DomainError> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            note: self.note,
            total_money: self.total_money,
            shipping_method: self.shipping_method,
            shipping_address: self.shipping_address,
            shipping_date: self.shipping_date,
            payment_method: self.payment_method,
            status: self.status.parse()?,
            active: self.active,
            order_date: self.order_date,
            details: details.into_iter().map(OrderDetail::from).collect(),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
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
    pub status: String,
    pub active: bool,
    pub order_date: DateTime<Utc>,
}

impl From<NewOrder> for NewOrderRow {
    fn from(o: NewOrder) -> Self {
        Self {
            user_id: o.user_id,
            full_name: o.full_name,
            email: o.email,
            phone_number: o.phone_number,
            address: o.address,
            note: o.note,
            total_money: o.total_money,
            shipping_method: o.shipping_method,
            shipping_address: o.shipping_address,
            shipping_date: o.shipping_date,
            payment_method: o.payment_method,
            status: o.status.as_str().to_string(),
            active: o.active,
            order_date: o.order_date,
        }
    }
}

/// Columns the update path may overwrite.
///
/// `active` is only ever written by the soft delete, and `total_money` and
/// `order_date` never change after creation.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub shipping_method: String,
    pub shipping_address: String,
    pub shipping_date: NaiveDate,
    pub payment_method: String,
    pub status: String,
}

impl From<&Order> for OrderChangeset {
    fn from(o: &Order) -> Self {
        Self {
            user_id: o.user_id,
            full_name: o.full_name.clone(),
            email: o.email.clone(),
            phone_number: o.phone_number.clone(),
            address: o.address.clone(),
            note: o.note.clone(),
            shipping_method: o.shipping_method.clone(),
            shipping_address: o.shipping_address.clone(),
            shipping_date: o.shipping_date,
            payment_method: o.payment_method.clone(),
            status: o.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_details)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderDetailRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub price: BigDecimal,
    pub quantity: i32,
    pub total_money: BigDecimal,
}

impl From<OrderDetailRow> for OrderDetail {
    fn from(d: OrderDetailRow) -> Self {
        Self {
            id: d.id,
            order_id: d.order_id,
            product_id: d.product_id,
            price: d.price,
            quantity: d.quantity,
            total_money: d.total_money,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_details)]
pub struct NewOrderDetailRow {
    pub order_id: i64,
    pub product_id: i64,
    pub price: BigDecimal,
    pub quantity: i32,
    pub total_money: BigDecimal,
}

impl NewOrderDetailRow {
    pub fn for_order(order_id: i64, d: NewOrderDetail) -> Self {
        Self {
            order_id,
            product_id: d.product_id,
            price: d.price,
            quantity: d.quantity,
            total_money: d.total_money,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub is_active: bool,
}

impl From<UserRow> for Account {
    fn from(u: UserRow) -> Self {
        Self {
            id: u.id,
            full_name: u.fullname,
            email: u.email,
            phone_number: u.phone_number,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: BigDecimal,
    pub category_id: Option<i64>,
}

impl From<ProductRow> for ProductSnapshot {
    fn from(p: ProductRow) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
        }
    }
}
