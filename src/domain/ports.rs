use super::errors::DomainError;
use super::order::{Account, NewOrder, NewOrderDetail, Order, OrderStatus, ProductSnapshot};

pub trait OrderRepository: Send + Sync + 'static {
    /// Insert the order and all of its details in one transaction.
    fn create(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError>;
    /// Active orders owned by `user_id`, newest first.
    fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, DomainError>;
    /// Active orders currently in `status`, newest first.
    fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError>;
    /// Overwrite the contact, shipping and status columns of an existing row.
    ///
    /// `active`, `total_money` and `order_date` are left as stored.
    fn update(&self, order: &Order) -> Result<Order, DomainError>;
    /// Flip `active` to false in a single write.
    fn deactivate(&self, id: i64) -> Result<Order, DomainError>;
    /// Move an active order from `from` to `to` in a single conditional write.
    ///
    /// Returns `None` when the row is no longer active or no longer in `from`.
    fn transition_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, DomainError>;
}

pub trait AccountLookup: Send + Sync + 'static {
    fn find_account(&self, id: i64) -> Result<Option<Account>, DomainError>;
}

pub trait CatalogLookup: Send + Sync + 'static {
    fn find_product(&self, id: i64) -> Result<Option<ProductSnapshot>, DomainError>;
    fn category_exists(&self, id: i64) -> Result<bool, DomainError>;
}

/// Hands a committed order to the confirmation channel.
///
/// Implementations must not block on delivery.
pub trait NotificationDispatcher: Send + Sync + 'static {
    fn dispatch(&self, order: &Order) -> Result<(), DomainError>;
}
