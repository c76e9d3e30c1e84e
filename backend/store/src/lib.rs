//! # Store
//!
//! Relational persistence for the food ordering backend.
//!
//! ## Layout
//!
//! - SQLite through `sqlx`, schema owned by the embedded migrations
//! - Foreign keys enforced on every connection
//! - One repository per entity, borrowed from a [`UnitOfWork`]
//! - A unit of work is one transaction, dropped without [`UnitOfWork::commit`] it rolls back
//!
//! ## Cascades
//!
//! | Parent | Child | On delete |
//! |---|---|---|
//! | restaurants | menu_items, orders | cascade |
//! | users | carts, orders | cascade |
//! | users | restaurants.owner_user_id | set null |
//! | carts | cart_items | cascade |
//! | orders | order_items | cascade |
//! | menu_items | cart_items | cascade |
//! | menu_items | order_items | no action |
//!
//! Cart totals are cached, so callers release affected cart lines through
//! [`carts::Carts`] before deleting menu items or restaurants.
use std::str::FromStr;

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use thiserror::Error;
use tracing::info;

pub mod cart_items;
pub mod carts;
pub mod menu_items;
pub mod models;
pub mod money;
pub mod order_items;
pub mod orders;
pub mod restaurants;
pub mod users;

pub use models::*;
pub use money::{Money, MoneyError};
pub use sqlx;

use cart_items::CartItems;
use carts::Carts;
use menu_items::MenuItems;
use order_items::OrderItems;
use orders::Orders;
use restaurants::Restaurants;
use users::Users;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Value already exists")]
    NotUnique,

    #[error("Row is still referenced")]
    StillReferenced,

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::NotUnique,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::StillReferenced
            }
            _ => StoreError::Database(error),
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // every in-memory connection is its own database
        let pool = if is_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        info!("Connected to {url}");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;

        info!("Migrations applied");
        Ok(())
    }

    pub async fn begin(&self) -> Result<UnitOfWork, StoreError> {
        Ok(UnitOfWork {
            tx: self.pool.begin().await?,
        })
    }
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub fn users(&mut self) -> Users<'_> {
        Users::new(&mut *self.tx)
    }

    pub fn restaurants(&mut self) -> Restaurants<'_> {
        Restaurants::new(&mut *self.tx)
    }

    pub fn menu_items(&mut self) -> MenuItems<'_> {
        MenuItems::new(&mut *self.tx)
    }

    pub fn carts(&mut self) -> Carts<'_> {
        Carts::new(&mut *self.tx)
    }

    pub fn cart_items(&mut self) -> CartItems<'_> {
        CartItems::new(&mut *self.tx)
    }

    pub fn orders(&mut self) -> Orders<'_> {
        Orders::new(&mut *self.tx)
    }

    pub fn order_items(&mut self) -> OrderItems<'_> {
        OrderItems::new(&mut *self.tx)
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;

    use super::*;

    pub async fn store() -> Store {
        let store = Store::connect("sqlite::memory:", 1).await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    pub fn price(cents: i64) -> Money {
        Money::from_cents(cents).unwrap()
    }

    pub async fn user(uow: &mut UnitOfWork, email: &str, role: Role) -> User {
        uow.users()
            .create(NewUser {
                name: "Test".into(),
                email: email.into(),
                password_hash: "hash".into(),
                address: None,
                contact_number: None,
                role,
            })
            .await
            .unwrap()
    }

    pub async fn restaurant(uow: &mut UnitOfWork, owner: Option<i64>) -> Restaurant {
        uow.restaurants()
            .create(RestaurantFields {
                name: "Diner".into(),
                location: "Main St".into(),
                contact_number: None,
                owner_user_id: owner,
            })
            .await
            .unwrap()
    }

    pub async fn menu_item(uow: &mut UnitOfWork, restaurant_id: i64, cents: i64) -> MenuItem {
        uow.menu_items()
            .create(MenuItemFields {
                name: "Soup".into(),
                description: None,
                category: "Starters".into(),
                price: price(cents),
                availability: true,
                special_dietary_info: None,
                taste_info: None,
                nutritional_info: None,
                restaurant_id,
            })
            .await
            .unwrap()
    }

    pub async fn order(
        uow: &mut UnitOfWork,
        user_id: i64,
        restaurant_id: i64,
        lines: &[NewLine],
    ) -> Order {
        let total = Money::total(lines.iter().map(|line| (line.price, line.quantity))).unwrap();

        let order = uow
            .orders()
            .create(NewOrder {
                user_id,
                restaurant_id,
                order_date: Utc::now(),
                total_amount: total,
                order_status: "Pending".into(),
            })
            .await
            .unwrap();

        for line in lines {
            uow.order_items().add(order.order_id, *line).await.unwrap();
        }

        order
    }
}
