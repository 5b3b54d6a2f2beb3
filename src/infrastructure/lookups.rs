//! Read-only views over the account and catalog tables.
//!
//! Registration and catalog maintenance live elsewhere; order processing only
//! needs to know whether a row exists and what a product costs right now.

use diesel::dsl::exists;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Account, ProductSnapshot};
use crate::domain::ports::{AccountLookup, CatalogLookup};
use crate::schema::{categories, products, users};

use super::models::{ProductRow, UserRow};

pub struct DieselAccountLookup {
    pool: DbPool,
}

impl DieselAccountLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AccountLookup for DieselAccountLookup {
    /// Deactivated accounts are reported as missing.
    fn find_account(&self, id: i64) -> Result<Option<Account>, DomainError> {
        let mut conn = self.pool.get()?;

        let user = users::table
            .filter(users::id.eq(id))
            .filter(users::is_active.eq(true))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user.map(Account::from))
    }
}

pub struct DieselCatalogLookup {
    pool: DbPool,
}

impl DieselCatalogLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogLookup for DieselCatalogLookup {
    fn find_product(&self, id: i64) -> Result<Option<ProductSnapshot>, DomainError> {
        let mut conn = self.pool.get()?;

        let product = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(product.map(ProductSnapshot::from))
    }

    fn category_exists(&self, id: i64) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let found = diesel::select(exists(categories::table.filter(categories::id.eq(id))))
            .get_result(&mut conn)?;

        Ok(found)
    }
}
