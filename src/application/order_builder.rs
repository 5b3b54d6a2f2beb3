//! Pure assembly of a new order aggregate.
//!
//! Nothing in here touches storage: lookups happen through the collaborator
//! traits and the clock is passed in, so every rule can be exercised with
//! fixed dates.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::domain::errors::DomainError;
use crate::domain::order::{
    Account, CartLine, NewOrder, NewOrderDetail, OrderRequest, OrderStatus, OrderUpdate,
    DEFAULT_SHIPPING_DELAY_DAYS,
};
use crate::domain::ports::CatalogLookup;

/// Character widths of the free-text `orders` columns.
const TEXT_COLUMN_LIMITS: [(&str, usize); 8] = [
    ("fullname", 100),
    ("email", 100),
    ("phone_number", 20),
    ("address", 200),
    ("note", 100),
    ("shipping_method", 100),
    ("shipping_address", 200),
    ("payment_method", 100),
];

/// Money columns are `NUMERIC(14, 2)`: every amount must stay below this.
const MONEY_LIMIT: i64 = 1_000_000_000_000;

/// `values` are matched positionally against `TEXT_COLUMN_LIMITS`.
fn check_text_lengths(values: [&str; 8]) -> Result<(), DomainError> {
    for ((name, max), value) in TEXT_COLUMN_LIMITS.iter().zip(values) {
        let len = value.trim().chars().count();
        if len > *max {
            return Err(DomainError::InvalidRequest(format!(
                "{} must be at most {} characters, got {}",
                name, max, len
            )));
        }
    }
    Ok(())
}

/// Checks that need no lookup: cart shape, quantities, phone, client total.
pub fn validate_request(request: &OrderRequest) -> Result<(), DomainError> {
    if request.user_id < 1 {
        return Err(DomainError::InvalidRequest(
            "user_id must be greater than or equal to 1".to_string(),
        ));
    }
    if request.phone_number.trim().is_empty() {
        return Err(DomainError::InvalidRequest(
            "phone_number is required".to_string(),
        ));
    }
    if request.cart_items.is_empty() {
        return Err(DomainError::InvalidRequest(
            "cart_items must not be empty".to_string(),
        ));
    }
    if let Some(line) = request.cart_items.iter().find(|l| l.quantity <= 0) {
        return Err(DomainError::InvalidRequest(format!(
            "quantity for product {} must be positive, got {}",
            line.product_id, line.quantity
        )));
    }
    if let Some(total) = &request.total_money {
        if *total < BigDecimal::from(0) {
            return Err(DomainError::InvalidRequest(
                "total_money must not be negative".to_string(),
            ));
        }
    }
    check_text_lengths([
        request.full_name.as_str(),
        request.email.as_str(),
        request.phone_number.as_str(),
        request.address.as_str(),
        request.note.as_str(),
        request.shipping_method.as_str(),
        request.shipping_address.as_str(),
        request.payment_method.as_str(),
    ])
}

/// Field checks for the update path; lookups happen in the service.
pub fn validate_update(update: &OrderUpdate) -> Result<(), DomainError> {
    if update.phone_number.trim().is_empty() {
        return Err(DomainError::InvalidRequest(
            "phone_number is required".to_string(),
        ));
    }
    check_text_lengths([
        update.full_name.as_str(),
        update.email.as_str(),
        update.phone_number.as_str(),
        update.address.as_str(),
        update.note.as_str(),
        update.shipping_method.as_str(),
        update.shipping_address.as_str(),
        update.payment_method.as_str(),
    ])
}

/// Picks the shipping date and enforces that it is not before `today`.
pub fn resolve_shipping_date(
    requested: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, DomainError> {
    let shipping_date = match requested {
        Some(date) => date,
        None => today
            .checked_add_days(Days::new(DEFAULT_SHIPPING_DELAY_DAYS))
            .ok_or_else(|| {
                DomainError::InvalidRequest("shipping date out of range".to_string())
            })?,
    };

    if shipping_date < today {
        return Err(DomainError::InvalidRequest(format!(
            "shipping date {} must not be earlier than {}",
            shipping_date, today
        )));
    }
    Ok(shipping_date)
}

/// Resolves every cart line against the catalog, in cart order, and prices it.
///
/// Fails on the first product the catalog does not know.
pub fn price_cart(
    catalog: &dyn CatalogLookup,
    cart: &[CartLine],
) -> Result<Vec<NewOrderDetail>, DomainError> {
    cart.iter()
        .map(|line| {
            let product = catalog.find_product(line.product_id)?.ok_or_else(|| {
                DomainError::NotFound(format!("product with id {}", line.product_id))
            })?;
            Ok(NewOrderDetail::priced(&product, line.quantity))
        })
        .collect()
}

pub fn sum_totals(details: &[NewOrderDetail]) -> BigDecimal {
    details
        .iter()
        .fold(BigDecimal::from(0), |acc, d| acc + &d.total_money)
}

/// Rejects line or order totals too large for the money columns.
pub fn check_money_range(details: &[NewOrderDetail]) -> Result<(), DomainError> {
    let limit = BigDecimal::from(MONEY_LIMIT);
    if let Some(line) = details.iter().find(|d| d.total_money >= limit) {
        return Err(DomainError::InvalidRequest(format!(
            "line total {} for product {} is too large",
            line.total_money, line.product_id
        )));
    }
    let total = sum_totals(details);
    if total >= limit {
        return Err(DomainError::InvalidRequest(format!(
            "order total {} is too large",
            total
        )));
    }
    Ok(())
}

/// Field-by-field mapping of the request onto a fresh PENDING order.
///
/// Blank contact name or email fall back to the account's own values.
pub fn assemble_order(
    request: &OrderRequest,
    account: &Account,
    details: &[NewOrderDetail],
    shipping_date: NaiveDate,
    now: DateTime<Utc>,
) -> NewOrder {
    NewOrder {
        user_id: account.id,
        full_name: non_blank_or(&request.full_name, &account.full_name),
        email: non_blank_or(&request.email, &account.email),
        phone_number: request.phone_number.trim().to_string(),
        address: request.address.clone(),
        note: request.note.clone(),
        total_money: sum_totals(details),
        shipping_method: request.shipping_method.clone(),
        shipping_address: request.shipping_address.clone(),
        shipping_date,
        payment_method: request.payment_method.clone(),
        status: OrderStatus::Pending,
        active: true,
        order_date: now,
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.trim().to_string()
    }
}
