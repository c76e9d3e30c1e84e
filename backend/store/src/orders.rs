use sqlx::SqliteConnection;

use crate::{
    StoreError,
    models::{NewOrder, Order, OrderDetails},
    order_items::OrderItems,
};

pub struct Orders<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> Orders<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, order_id: i64) -> Result<Option<Order>, StoreError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(order)
    }

    pub async fn find_details(&mut self, order_id: i64) -> Result<Option<OrderDetails>, StoreError> {
        let Some(order) = self.find(order_id).await? else {
            return Ok(None);
        };

        self.with_lines(order).await.map(Some)
    }

    pub async fn list_details_by_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<OrderDetails>, StoreError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ? ORDER BY order_id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        self.all_with_lines(orders).await
    }

    pub async fn list_details_by_restaurant(
        &mut self,
        restaurant_id: i64,
    ) -> Result<Vec<OrderDetails>, StoreError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE restaurant_id = ? ORDER BY order_id",
        )
        .bind(restaurant_id)
        .fetch_all(&mut *self.conn)
        .await?;

        self.all_with_lines(orders).await
    }

    pub async fn create(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_id, restaurant_id, order_date, total_amount, order_status)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(order.user_id)
        .bind(order.restaurant_id)
        .bind(order.order_date)
        .bind(order.total_amount)
        .bind(order.order_status)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(order)
    }

    pub async fn set_status(
        &mut self,
        order_id: i64,
        status: String,
    ) -> Result<Option<Order>, StoreError> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET order_status = ? WHERE order_id = ? RETURNING *",
        )
        .bind(status)
        .bind(order_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(order)
    }

    /// Deletes the order lines and then the order.
    pub async fn delete(&mut self, order_id: i64) -> Result<bool, StoreError> {
        OrderItems::new(&mut *self.conn).delete_by_order(order_id).await?;

        let result = sqlx::query("DELETE FROM orders WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn with_lines(&mut self, order: Order) -> Result<OrderDetails, StoreError> {
        let order_items = OrderItems::new(&mut *self.conn).lines(order.order_id).await?;

        Ok(OrderDetails { order, order_items })
    }

    async fn all_with_lines(&mut self, orders: Vec<Order>) -> Result<Vec<OrderDetails>, StoreError> {
        let mut details = Vec::with_capacity(orders.len());

        for order in orders {
            details.push(self.with_lines(order).await?);
        }

        Ok(details)
    }
}
