use sqlx::SqliteConnection;

use crate::{
    StoreError,
    models::{NewUser, ProfileChanges, User},
};

pub struct Users<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(user)
    }

    /// Exact, case sensitive match.
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(user)
    }

    pub async fn list(&mut self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY user_id")
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(users)
    }

    pub async fn create(&mut self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, address, contact_number, role)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.address)
        .bind(user.contact_number)
        .bind(user.role)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(user)
    }

    /// Overwrites only the fields present in `changes`.
    pub async fn update_profile(
        &mut self,
        user_id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                address = COALESCE(?, address),
                contact_number = COALESCE(?, contact_number)
             WHERE user_id = ?
             RETURNING *",
        )
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.address)
        .bind(changes.contact_number)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(user)
    }

    /// Removes the user with their cart and orders, owned restaurants lose their owner.
    pub async fn delete(&mut self, user_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{models::Role, testing::*};

    use super::*;

    #[tokio::test]
    async fn test_profile_update_is_partial() {
        let store = store().await;
        let mut uow = store.begin().await.unwrap();
        let ada = user(&mut uow, "ada@example.com", Role::Customer).await;

        let updated = uow
            .users()
            .update_profile(
                ada.user_id,
                ProfileChanges {
                    address: Some("12 Analytical Way".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, ada.name);
        assert_eq!(updated.email, ada.email);
        assert_eq!(updated.address.as_deref(), Some("12 Analytical Way"));
        assert_eq!(updated.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = store().await;
        let mut uow = store.begin().await.unwrap();
        user(&mut uow, "ada@example.com", Role::User).await;

        assert!(uow.users().find_by_email("ada@example.com").await.unwrap().is_some());
        assert!(uow.users().find_by_email("ADA@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = store().await;
        let mut uow = store.begin().await.unwrap();

        assert!(uow.users().find(42).await.unwrap().is_none());
        assert!(uow.users().update_profile(42, ProfileChanges::default()).await.unwrap().is_none());
        assert!(!uow.users().delete(42).await.unwrap());
    }
}
