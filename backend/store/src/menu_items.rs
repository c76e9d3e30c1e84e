use sqlx::SqliteConnection;

use crate::{
    StoreError,
    models::{MenuItem, MenuItemFields},
};

pub struct MenuItems<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> MenuItems<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, menu_item_id: i64) -> Result<Option<MenuItem>, StoreError> {
        let item = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE menu_item_id = ?")
            .bind(menu_item_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(item)
    }

    pub async fn list_by_restaurant(
        &mut self,
        restaurant_id: i64,
    ) -> Result<Vec<MenuItem>, StoreError> {
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT * FROM menu_items WHERE restaurant_id = ? ORDER BY menu_item_id",
        )
        .bind(restaurant_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(items)
    }

    pub async fn create(&mut self, fields: MenuItemFields) -> Result<MenuItem, StoreError> {
        let item = sqlx::query_as::<_, MenuItem>(
            "INSERT INTO menu_items (name, description, category, price, availability,
                special_dietary_info, taste_info, nutritional_info, restaurant_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.price)
        .bind(fields.availability)
        .bind(fields.special_dietary_info)
        .bind(fields.taste_info)
        .bind(fields.nutritional_info)
        .bind(fields.restaurant_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(item)
    }

    /// Overwrites every mutable field. The item stays with the restaurant it was
    /// created for, so `fields.restaurant_id` is ignored. Cart and order lines
    /// keep their snapshot prices.
    pub async fn update(
        &mut self,
        menu_item_id: i64,
        fields: MenuItemFields,
    ) -> Result<Option<MenuItem>, StoreError> {
        let item = sqlx::query_as::<_, MenuItem>(
            "UPDATE menu_items SET
                name = ?, description = ?, category = ?, price = ?, availability = ?,
                special_dietary_info = ?, taste_info = ?, nutritional_info = ?
             WHERE menu_item_id = ?
             RETURNING *",
        )
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.price)
        .bind(fields.availability)
        .bind(fields.special_dietary_info)
        .bind(fields.taste_info)
        .bind(fields.nutritional_info)
        .bind(menu_item_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(item)
    }

    /// Fails with [`StoreError::StillReferenced`] while an order line points at the item.
    pub async fn delete(&mut self, menu_item_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE menu_item_id = ?")
            .bind(menu_item_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
