use sqlx::SqliteConnection;

use crate::{
    StoreError,
    models::{Restaurant, RestaurantFields},
};

pub struct Restaurants<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> Restaurants<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, restaurant_id: i64) -> Result<Option<Restaurant>, StoreError> {
        let restaurant =
            sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE restaurant_id = ?")
                .bind(restaurant_id)
                .fetch_optional(&mut *self.conn)
                .await?;

        Ok(restaurant)
    }

    pub async fn list(&mut self) -> Result<Vec<Restaurant>, StoreError> {
        let restaurants =
            sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY restaurant_id")
                .fetch_all(&mut *self.conn)
                .await?;

        Ok(restaurants)
    }

    pub async fn list_by_owner(&mut self, user_id: i64) -> Result<Vec<Restaurant>, StoreError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            "SELECT * FROM restaurants WHERE owner_user_id = ? ORDER BY restaurant_id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(restaurants)
    }

    pub async fn create(&mut self, fields: RestaurantFields) -> Result<Restaurant, StoreError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            "INSERT INTO restaurants (name, location, contact_number, owner_user_id)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(fields.name)
        .bind(fields.location)
        .bind(fields.contact_number)
        .bind(fields.owner_user_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(restaurant)
    }

    pub async fn update(
        &mut self,
        restaurant_id: i64,
        fields: RestaurantFields,
    ) -> Result<Option<Restaurant>, StoreError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            "UPDATE restaurants SET name = ?, location = ?, contact_number = ?, owner_user_id = ?
             WHERE restaurant_id = ?
             RETURNING *",
        )
        .bind(fields.name)
        .bind(fields.location)
        .bind(fields.contact_number)
        .bind(fields.owner_user_id)
        .bind(restaurant_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(restaurant)
    }

    /// Cascades to menu items and orders. Release cart lines first.
    pub async fn delete(&mut self, restaurant_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE restaurant_id = ?")
            .bind(restaurant_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{models::Role, testing::*};

    #[tokio::test]
    async fn test_list_by_owner() {
        let store = store().await;
        let mut uow = store.begin().await.unwrap();

        let owner = user(&mut uow, "owner@example.com", Role::Restaurant).await;
        let mine = restaurant(&mut uow, Some(owner.user_id)).await;
        restaurant(&mut uow, None).await;

        assert_eq!(uow.restaurants().list().await.unwrap().len(), 2);
        assert_eq!(uow.restaurants().list_by_owner(owner.user_id).await.unwrap(), vec![mine]);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_rejected() {
        let store = store().await;
        let mut uow = store.begin().await.unwrap();

        let error = uow
            .restaurants()
            .create(crate::RestaurantFields {
                name: "Ghost Kitchen".into(),
                location: "Nowhere".into(),
                contact_number: None,
                owner_user_id: Some(99),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, crate::StoreError::StillReferenced));
    }
}
