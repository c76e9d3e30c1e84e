use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::{
    StoreError,
    models::{MenuItem, NewLine, OrderItem, OrderLine},
};

pub struct OrderItems<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> OrderItems<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&mut self, order_id: i64, line: NewLine) -> Result<OrderItem, StoreError> {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (order_id, menu_item_id, quantity, price)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(order_id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .bind(line.price)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(item)
    }

    pub async fn lines(&mut self, order_id: i64) -> Result<Vec<OrderLine>, StoreError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY order_item_id",
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let menu_items: HashMap<i64, MenuItem> = sqlx::query_as::<_, MenuItem>(
            "SELECT DISTINCT m.* FROM menu_items m
             JOIN order_items oi ON oi.menu_item_id = m.menu_item_id
             WHERE oi.order_id = ?",
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?
        .into_iter()
        .map(|menu_item| (menu_item.menu_item_id, menu_item))
        .collect();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let menu_item = menu_items.get(&item.menu_item_id)?.clone();
                Some(OrderLine { item, menu_item })
            })
            .collect())
    }

    pub async fn delete_by_order(&mut self, order_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }
}
