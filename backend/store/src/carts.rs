//! Carts and their cached `total_price`.
//!
//! The total is never re-derived on read. Every mutation of a cart line moves
//! it by the same delta inside the same transaction, as a single SQL update.
use sqlx::SqliteConnection;

use crate::{
    StoreError,
    cart_items::CartItems,
    models::{Cart, CartDetails},
    money::Money,
};

pub struct Carts<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> Carts<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, cart_id: i64) -> Result<Option<Cart>, StoreError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE cart_id = ?")
            .bind(cart_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(cart)
    }

    pub async fn find_by_user(&mut self, user_id: i64) -> Result<Option<Cart>, StoreError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(cart)
    }

    pub async fn create(&mut self, user_id: i64) -> Result<Cart, StoreError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (user_id, total_price) VALUES (?, 0) RETURNING *",
        )
        .bind(user_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(cart)
    }

    /// The user's cart with every line and its menu item.
    pub async fn find_details(&mut self, user_id: i64) -> Result<Option<CartDetails>, StoreError> {
        let Some(cart) = self.find_by_user(user_id).await? else {
            return Ok(None);
        };

        let cart_items = CartItems::new(&mut *self.conn).lines(cart.cart_id).await?;

        Ok(Some(CartDetails { cart, cart_items }))
    }

    /// Moves the total by `delta`, failing if the result leaves the money domain.
    pub async fn adjust_total(&mut self, cart_id: i64, delta: Money) -> Result<Cart, StoreError> {
        let cart = sqlx::query_as::<_, Cart>(
            "UPDATE carts SET total_price = total_price + ? WHERE cart_id = ? RETURNING *",
        )
        .bind(delta)
        .bind(cart_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Money::from_cents(cart.total_price.cents())?;

        Ok(cart)
    }

    pub async fn set_total(&mut self, cart_id: i64, total: Money) -> Result<Cart, StoreError> {
        let cart = sqlx::query_as::<_, Cart>(
            "UPDATE carts SET total_price = ? WHERE cart_id = ? RETURNING *",
        )
        .bind(total)
        .bind(cart_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(cart)
    }

    /// Subtracts the lines pointing at `menu_item_id` from their carts' totals.
    /// Call before deleting the menu item, whose cascade removes those lines.
    pub async fn release_menu_item(&mut self, menu_item_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE carts SET total_price = total_price - (
                SELECT COALESCE(SUM(ci.price * ci.quantity), 0) FROM cart_items ci
                WHERE ci.cart_id = carts.cart_id AND ci.menu_item_id = ?
             )
             WHERE cart_id IN (SELECT cart_id FROM cart_items WHERE menu_item_id = ?)",
        )
        .bind(menu_item_id)
        .bind(menu_item_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Same as [`Carts::release_menu_item`] for every menu item of a restaurant.
    pub async fn release_restaurant(&mut self, restaurant_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE carts SET total_price = total_price - (
                SELECT COALESCE(SUM(ci.price * ci.quantity), 0) FROM cart_items ci
                JOIN menu_items m ON m.menu_item_id = ci.menu_item_id
                WHERE ci.cart_id = carts.cart_id AND m.restaurant_id = ?
             )
             WHERE cart_id IN (
                SELECT ci.cart_id FROM cart_items ci
                JOIN menu_items m ON m.menu_item_id = ci.menu_item_id
                WHERE m.restaurant_id = ?
             )",
        )
        .bind(restaurant_id)
        .bind(restaurant_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
