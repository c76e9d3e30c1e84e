use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::{
    StoreError,
    models::{CartItem, CartLine, MenuItem, NewLine},
};

pub struct CartItems<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CartItems<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, cart_item_id: i64) -> Result<Option<CartItem>, StoreError> {
        let item = sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE cart_item_id = ?")
            .bind(cart_item_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(item)
    }

    /// Cart owner of a line, used for ownership checks.
    pub async fn owner(&mut self, cart_item_id: i64) -> Result<Option<i64>, StoreError> {
        let owner = sqlx::query_scalar::<_, i64>(
            "SELECT c.user_id FROM cart_items ci
             JOIN carts c ON c.cart_id = ci.cart_id
             WHERE ci.cart_item_id = ?",
        )
        .bind(cart_item_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(owner)
    }

    pub async fn add(&mut self, cart_id: i64, line: NewLine) -> Result<CartItem, StoreError> {
        let item = sqlx::query_as::<_, CartItem>(
            "INSERT INTO cart_items (cart_id, menu_item_id, quantity, price)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(cart_id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .bind(line.price)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(item)
    }

    pub async fn set_quantity(
        &mut self,
        cart_item_id: i64,
        quantity: i32,
    ) -> Result<Option<CartItem>, StoreError> {
        let item = sqlx::query_as::<_, CartItem>(
            "UPDATE cart_items SET quantity = ? WHERE cart_item_id = ? RETURNING *",
        )
        .bind(quantity)
        .bind(cart_item_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(item)
    }

    pub async fn delete(&mut self, cart_item_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_item_id = ?")
            .bind(cart_item_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear(&mut self, cart_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn lines(&mut self, cart_id: i64) -> Result<Vec<CartLine>, StoreError> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = ? ORDER BY cart_item_id",
        )
        .bind(cart_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let menu_items: HashMap<i64, MenuItem> = sqlx::query_as::<_, MenuItem>(
            "SELECT DISTINCT m.* FROM menu_items m
             JOIN cart_items ci ON ci.menu_item_id = m.menu_item_id
             WHERE ci.cart_id = ?",
        )
        .bind(cart_id)
        .fetch_all(&mut *self.conn)
        .await?
        .into_iter()
        .map(|menu_item| (menu_item.menu_item_id, menu_item))
        .collect();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let menu_item = menu_items.get(&item.menu_item_id)?.clone();
                Some(CartLine { item, menu_item })
            })
            .collect())
    }
}
