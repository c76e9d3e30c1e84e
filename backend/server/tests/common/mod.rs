#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use food::{app, config::Config, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PASSWORD: &str = "secret1";

pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("not json ({e}): {}", self.body))
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
}

/// A caller with a valid token.
pub struct Account {
    pub id: i64,
    pub token: String,
}

pub async fn spawn() -> TestApp {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".into()),
        "JWT_SECRET" => Some("integration-test-secret".into()),
        "JWT_ISSUER" => Some("food".into()),
        "JWT_AUDIENCE" => Some("food-clients".into()),
        _ => None,
    })
    .unwrap();

    let state = AppState::new(config).await.unwrap();

    TestApp {
        app: app(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        Reply {
            status,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> Reply {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Reply {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, email: &str, role: &str) -> Reply {
        let body = json!({
            "name": "Test User",
            "email": email,
            "password": PASSWORD,
            "role": role,
        });

        self.send(Method::POST, "/api/auth/register", None, Some(body))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Reply {
        let body = json!({ "email": email, "password": password });

        self.send(Method::POST, "/api/auth/login", None, Some(body))
            .await
    }

    /// Registers and logs in a fresh account.
    pub async fn account(&self, email: &str, role: &str) -> Account {
        assert_eq!(self.register(email, role).await.status, StatusCode::OK);

        let reply = self.login(email, PASSWORD).await;
        assert_eq!(reply.status, StatusCode::OK);

        let token = reply.json()["token"].as_str().unwrap().to_string();
        let id = self.state.tokens.verify(&token).unwrap().sub.parse().unwrap();

        Account { id, token }
    }

    /// Without `owner` the creating admin owns the restaurant.
    pub async fn restaurant(&self, admin: &Account, owner_or_admin: Option<i64>) -> i64 {
        let reply = self
            .post(
                "/api/restaurant",
                &admin.token,
                json!({
                    "name": "Diner",
                    "location": "1 Main St",
                    "contactNumber": "555-0100-22",
                    "ownerUserId": owner_or_admin,
                }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        reply.json()["restaurantId"].as_i64().unwrap()
    }

    pub async fn menu_item(&self, admin: &Account, restaurant_id: i64, price: Value) -> i64 {
        let reply = self
            .post(
                "/api/menuitem",
                &admin.token,
                json!({
                    "name": "Soup",
                    "description": "Hot",
                    "category": "Starters",
                    "price": price,
                    "availability": true,
                    "restaurantId": restaurant_id,
                }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        reply.json()["menuItemId"].as_i64().unwrap()
    }

    pub async fn add_to_cart(&self, account: &Account, menu_item_id: i64, quantity: i32, price: Value) -> Reply {
        self.post(
            "/api/cart/add",
            &account.token,
            json!({ "menuItemId": menu_item_id, "quantity": quantity, "price": price }),
        )
        .await
    }
}
