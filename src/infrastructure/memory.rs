//! In-memory adapters for the order ports.
//!
//! They behave like the diesel-backed ones (atomic create, newest-first
//! listings, soft-delete filtering, conditional status writes) and back the
//! unit and handler tests. Test builds only.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    Account, NewOrder, NewOrderDetail, Order, OrderDetail, OrderStatus, ProductSnapshot,
};
use crate::domain::ports::{AccountLookup, CatalogLookup, NotificationDispatcher, OrderRepository};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct OrderTables {
    orders: BTreeMap<i64, Order>,
    next_order_id: i64,
    next_detail_id: i64,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    tables: Mutex<OrderTables>,
    fail_writes: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose writes always fail with a storage error.
    pub fn failing() -> Self {
        let repo = Self::default();
        repo.fail_writes.store(true, Ordering::SeqCst);
        repo
    }

    pub fn order_count(&self) -> usize {
        lock(&self.tables).orders.len()
    }

    pub fn detail_count(&self) -> usize {
        lock(&self.tables)
            .orders
            .values()
            .map(|o| o.details.len())
            .sum()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Storage("write rejected".to_string()));
        }
        Ok(())
    }

    fn newest_first(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let tables = lock(&self.tables);
        let mut found: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.active && keep(o))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.order_date
                .cmp(&a.order_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        found
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order, DomainError> {
        self.check_writable()?;
        let mut tables = lock(&self.tables);

        tables.next_order_id += 1;
        let order_id = tables.next_order_id;
        let mut lines = Vec::with_capacity(details.len());
        for d in details {
            tables.next_detail_id += 1;
            lines.push(OrderDetail {
                id: tables.next_detail_id,
                order_id,
                product_id: d.product_id,
                price: d.price,
                quantity: d.quantity,
                total_money: d.total_money,
            });
        }

        let stored = Order {
            id: order_id,
            user_id: order.user_id,
            full_name: order.full_name,
            email: order.email,
            phone_number: order.phone_number,
            address: order.address,
            note: order.note,
            total_money: order.total_money,
            shipping_method: order.shipping_method,
            shipping_address: order.shipping_address,
            shipping_date: order.shipping_date,
            payment_method: order.payment_method,
            status: order.status,
            active: order.active,
            order_date: order.order_date,
            details: lines,
        };
        tables.orders.insert(order_id, stored.clone());
        Ok(stored)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.tables).orders.get(&id).cloned())
    }

    fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, DomainError> {
        Ok(self.newest_first(|o| o.user_id == user_id))
    }

    fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        Ok(self.newest_first(|o| o.status == status))
    }

    fn update(&self, order: &Order) -> Result<Order, DomainError> {
        self.check_writable()?;
        let mut tables = lock(&self.tables);

        let stored = tables
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| DomainError::NotFound(format!("order with id {}", order.id)))?;
        let details = std::mem::take(&mut stored.details);
        *stored = Order {
            details,
            total_money: stored.total_money.clone(),
            active: stored.active,
            order_date: stored.order_date,
            ..order.clone()
        };
        Ok(stored.clone())
    }

    fn deactivate(&self, id: i64) -> Result<Order, DomainError> {
        self.check_writable()?;
        let mut tables = lock(&self.tables);

        let stored = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::NotFound(format!("order with id {}", id)))?;
        stored.active = false;
        Ok(stored.clone())
    }

    fn transition_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        self.check_writable()?;
        let mut tables = lock(&self.tables);

        Ok(tables
            .orders
            .get_mut(&id)
            .filter(|o| o.active && o.status == from)
            .map(|o| {
                o.status = to;
                o.clone()
            }))
    }
}

#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: Mutex<HashMap<i64, Account>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: Account) {
        lock(&self.accounts).insert(account.id, account);
    }
}

impl AccountLookup for InMemoryAccounts {
    fn find_account(&self, id: i64) -> Result<Option<Account>, DomainError> {
        Ok(lock(&self.accounts).get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<i64, ProductSnapshot>>,
    categories: Mutex<HashSet<i64>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product or replace its name and price.
    pub fn insert_product(&self, id: i64, name: &str, price: BigDecimal) {
        lock(&self.products).insert(
            id,
            ProductSnapshot {
                id,
                name: name.to_string(),
                price,
            },
        );
    }

    pub fn insert_category(&self, id: i64) {
        lock(&self.categories).insert(id);
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn find_product(&self, id: i64) -> Result<Option<ProductSnapshot>, DomainError> {
        Ok(lock(&self.products).get(&id).cloned())
    }

    fn category_exists(&self, id: i64) -> Result<bool, DomainError> {
        Ok(lock(&self.categories).contains(&id))
    }
}

/// Remembers which orders were handed over instead of sending anything.
#[derive(Default)]
pub struct RecordingDispatcher {
    dispatched: Mutex<Vec<i64>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            dispatched: Mutex::default(),
            fail: true,
        }
    }

    pub fn dispatched(&self) -> Vec<i64> {
        lock(&self.dispatched).clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, order: &Order) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::Notification("channel closed".to_string()));
        }
        lock(&self.dispatched).push(order.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_knows_inserted_categories() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_category(2);

        assert!(catalog.category_exists(2).unwrap());
        assert!(!catalog.category_exists(3).unwrap());
    }

    #[test]
    fn update_of_unknown_order_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let accounts = InMemoryAccounts::new();
        assert!(accounts.find_account(1).unwrap().is_none());

        let order = Order {
            id: 9,
            user_id: 1,
            full_name: String::new(),
            email: String::new(),
            phone_number: "1".to_string(),
            address: String::new(),
            note: String::new(),
            total_money: BigDecimal::from(0),
            shipping_method: String::new(),
            shipping_address: String::new(),
            shipping_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payment_method: String::new(),
            status: OrderStatus::Pending,
            active: true,
            order_date: chrono::Utc::now(),
            details: vec![],
        };

        assert!(matches!(repo.update(&order), Err(DomainError::NotFound(_))));
        assert!(matches!(repo.deactivate(9), Err(DomainError::NotFound(_))));
        assert_eq!(
            repo.transition_status(9, OrderStatus::Pending, OrderStatus::Confirmed)
                .unwrap(),
            None
        );
    }
}
