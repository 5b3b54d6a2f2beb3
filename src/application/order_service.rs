use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderRequest, OrderStatus, OrderUpdate};
use crate::domain::ports::{AccountLookup, CatalogLookup, NotificationDispatcher, OrderRepository};

use super::order_builder::{
    assemble_order, check_money_range, price_cart, resolve_shipping_date, validate_request,
    validate_update,
};

/// Outcome of a successful order creation.
///
/// `warnings` carries problems that did not stop the order from being stored,
/// such as a failed confirmation dispatch.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    accounts: Arc<dyn AccountLookup>,
    catalog: Arc<dyn CatalogLookup>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: fn() -> DateTime<Utc>,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        accounts: Arc<dyn AccountLookup>,
        catalog: Arc<dyn CatalogLookup>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repo,
            accounts,
            catalog,
            notifier,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, mostly for tests pinned to a date.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn create_order(&self, request: OrderRequest) -> Result<CreatedOrder, DomainError> {
        validate_request(&request)?;

        let account = self
            .accounts
            .find_account(request.user_id)?
            .ok_or_else(|| DomainError::NotFound(format!("user with id {}", request.user_id)))?;

        let now = (self.clock)();
        let shipping_date = resolve_shipping_date(request.shipping_date, now.date_naive())?;
        let details = price_cart(self.catalog.as_ref(), &request.cart_items)?;
        check_money_range(&details)?;
        let new_order = assemble_order(&request, &account, &details, shipping_date, now);

        let mut warnings = Vec::new();
        if let Some(client_total) = &request.total_money {
            if *client_total != new_order.total_money {
                log::warn!(
                    "Client total {} for user {} differs from computed total {}; keeping computed",
                    client_total,
                    account.id,
                    new_order.total_money
                );
                warnings.push(format!(
                    "total_money {} was replaced by the computed total {}",
                    client_total, new_order.total_money
                ));
            }
        }

        let order = self.repo.create(new_order, details)?;
        log::info!(
            "Created order {} for user {} with {} line(s), total {}",
            order.id,
            order.user_id,
            order.details.len(),
            order.total_money
        );

        if let Err(e) = self.notifier.dispatch(&order) {
            log::warn!("Order {} stored but confirmation dispatch failed: {}", order.id, e);
            warnings.push(format!("confirmation was not sent: {}", e));
        }

        Ok(CreatedOrder { order, warnings })
    }

    pub fn get_order(&self, id: i64) -> Result<Order, DomainError> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("order with id {}", id)))
    }

    pub fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order, DomainError> {
        let mut order = self.get_order(id)?;

        if self.accounts.find_account(update.user_id)?.is_none() {
            return Err(DomainError::NotFound(format!(
                "user with id {}",
                update.user_id
            )));
        }
        validate_update(&update)?;
        if let Some(date) = update.shipping_date {
            let placed_on = order.order_date.date_naive();
            if date < placed_on {
                return Err(DomainError::InvalidRequest(format!(
                    "shipping date {} must not be earlier than order date {}",
                    date, placed_on
                )));
            }
        }

        order.apply_update(&update);
        let updated = self.repo.update(&order)?;
        log::info!("Updated order {}", updated.id);
        Ok(updated)
    }

    /// Soft delete: the row and its details stay, only `active` flips.
    pub fn delete_order(&self, id: i64) -> Result<(), DomainError> {
        self.repo.deactivate(id)?;
        log::info!("Deactivated order {}", id);
        Ok(())
    }

    /// The write only lands if the order is still active and still in the
    /// status the lifecycle check saw.
    pub fn change_status(&self, id: i64, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self.get_order(id)?;

        if !order.active {
            return Err(DomainError::InvalidRequest(format!(
                "order {} has been deleted",
                id
            )));
        }
        if !order.status.can_transition_to(status) {
            return Err(DomainError::InvalidRequest(format!(
                "cannot move order {} from {} to {}",
                id, order.status, status
            )));
        }
        if order.status == status {
            return Ok(order);
        }

        let previous = order.status;
        let updated = self
            .repo
            .transition_status(id, previous, status)?
            .ok_or_else(|| {
                log::warn!(
                    "Order {} changed concurrently, {} -> {} not applied",
                    id,
                    previous,
                    status
                );
                DomainError::InvalidRequest(format!(
                    "order {} was modified concurrently, cannot move it from {} to {}",
                    id, previous, status
                ))
            })?;
        log::info!("Order {} moved from {} to {}", id, previous, status);
        Ok(updated)
    }

    pub fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, DomainError> {
        self.repo.find_by_user(user_id)
    }

    pub fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        self.repo.find_by_status(status)
    }
}
