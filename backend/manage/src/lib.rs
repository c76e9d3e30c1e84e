//! Operator tasks run outside the HTTP server.
use anyhow::{Context, bail};
use food::password::hash_password;
use store::{NewUser, Role, Store, User};
use tracing::info;
use validator::Validate;

#[derive(Debug, Validate)]
pub struct AdminAccount {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email, length(max = 100))]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,
}

pub async fn migrate(store: &Store) -> anyhow::Result<()> {
    store.migrate().await.context("Failed to apply migrations")?;
    info!("Migrations applied");

    Ok(())
}

/// Fails when the email is already taken.
pub async fn create_admin(store: &Store, account: AdminAccount) -> anyhow::Result<User> {
    account.validate()?;

    let password_hash = hash_password(account.password).await?;

    let mut uow = store.begin().await?;

    if uow.users().find_by_email(&account.email).await?.is_some() {
        bail!("Email already exists: {}", account.email);
    }

    let user = uow
        .users()
        .create(NewUser {
            name: account.name,
            email: account.email,
            password_hash,
            address: None,
            contact_number: None,
            role: Role::Admin,
        })
        .await?;

    uow.commit().await?;
    info!("Created admin {} ({})", user.user_id, user.email);

    Ok(user)
}

#[cfg(test)]
mod tests {
    use food::password::verify_password;

    use super::*;

    async fn store() -> Store {
        let store = Store::connect("sqlite::memory:", 1).await.unwrap();
        migrate(&store).await.unwrap();
        store
    }

    fn account(email: &str) -> AdminAccount {
        AdminAccount {
            name: "Admin".into(),
            email: email.into(),
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn test_create_admin() {
        let store = store().await;

        let user = create_admin(&store, account("admin@example.com")).await.unwrap();

        assert_eq!(user.role, Role::Admin);
        assert!(
            verify_password("secret1".into(), user.password_hash)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_admin_twice() {
        let store = store().await;
        create_admin(&store, account("admin@example.com")).await.unwrap();

        let err = create_admin(&store, account("admin@example.com"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Email already exists"));
    }

    #[tokio::test]
    async fn test_create_admin_validates() {
        let store = store().await;

        assert!(create_admin(&store, account("nope")).await.is_err());

        let mut uow = store.begin().await.unwrap();
        assert!(uow.users().list().await.unwrap().is_empty());
    }
}
