use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, NewOrderDetail, Order, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_details, orders};

use super::models::{NewOrderDetailRow, NewOrderRow, OrderChangeset, OrderDetailRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: i64) -> DomainError {
    DomainError::NotFound(format!("order with id {}", id))
}

fn with_details(conn: &mut PgConnection, row: OrderRow) -> Result<Order, DomainError> {
    let lines = OrderDetailRow::belonging_to(&row)
        .select(OrderDetailRow::as_select())
        .order(order_details::id.asc())
        .load(conn)?;

    row.into_order(lines)
}

/// Attach each order's details, preserving the order of `rows`.
fn load_with_details(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, DomainError> {
    let details = OrderDetailRow::belonging_to(&rows)
        .select(OrderDetailRow::as_select())
        .order(order_details::id.asc())
        .load(conn)?;

    details
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(lines, row)| row.into_order(lines))
        .collect()
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let row: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow::from(order))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its details; any failure here rolls back step 1
            let new_details: Vec<NewOrderDetailRow> = details
                .into_iter()
                .map(|d| NewOrderDetailRow::for_order(row.id, d))
                .collect();
            let lines: Vec<OrderDetailRow> = diesel::insert_into(order_details::table)
                .values(&new_details)
                .returning(OrderDetailRow::as_returning())
                .get_results(conn)?;

            row.into_order(lines)
        })
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        order.map(|row| with_details(&mut conn, row)).transpose()
    }

    fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = orders::table
                .filter(orders::user_id.eq(user_id))
                .filter(orders::active.eq(true))
                .select(OrderRow::as_select())
                .order((orders::order_date.desc(), orders::id.desc()))
                .load(conn)?;

            load_with_details(conn, rows)
        })
    }

    fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = orders::table
                .filter(orders::status.eq(status.as_str()))
                .filter(orders::active.eq(true))
                .select(OrderRow::as_select())
                .order((orders::order_date.desc(), orders::id.desc()))
                .load(conn)?;

            load_with_details(conn, rows)
        })
    }

    fn update(&self, order: &Order) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(orders::table.find(order.id))
                .set(&OrderChangeset::from(order))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| not_found(order.id))?;

            with_details(conn, row)
        })
    }

    fn deactivate(&self, id: i64) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(orders::table.find(id))
                .set(orders::active.eq(false))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| not_found(id))?;

            with_details(conn, row)
        })
    }

    fn transition_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Matches nothing if another request deleted or moved the order first.
            let row = diesel::update(
                orders::table
                    .filter(orders::id.eq(id))
                    .filter(orders::status.eq(from.as_str()))
                    .filter(orders::active.eq(true)),
            )
            .set(orders::status.eq(to.as_str()))
            .returning(OrderRow::as_returning())
            .get_result(conn)
            .optional()?;

            row.map(|row| with_details(conn, row)).transpose()
        })
    }
}
