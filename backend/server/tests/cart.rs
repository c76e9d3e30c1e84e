mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, spawn};

async fn with_menu_item(app: &TestApp) -> i64 {
    let admin = app.account("admin@example.com", "Admin").await;
    let restaurant_id = app.restaurant(&admin, None).await;

    app.menu_item(&admin, restaurant_id, json!(100)).await
}

#[tokio::test]
async fn test_add_to_empty_cart() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let shopper = app.account("shopper@example.com", "User").await;

    assert_eq!(app.get("/api/cart", &shopper.token).await.status, StatusCode::NOT_FOUND);

    let reply = app.add_to_cart(&shopper, menu_item_id, 2, json!(100)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "Item added to cart.");

    let cart = app.get("/api/cart", &shopper.token).await.json();
    assert_eq!(cart["userId"], shopper.id);
    assert_eq!(cart["totalPrice"], "200.00");
    assert_eq!(cart["cartItems"].as_array().unwrap().len(), 1);
    assert_eq!(cart["cartItems"][0]["quantity"], 2);
    assert_eq!(cart["cartItems"][0]["menuItem"]["menuItemId"], menu_item_id);
}

#[tokio::test]
async fn test_add_unknown_menu_item() {
    let app = spawn().await;
    let shopper = app.account("shopper@example.com", "User").await;

    let reply = app.add_to_cart(&shopper, 404, 1, json!(1)).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, "Menu item not found.");
}

#[tokio::test]
async fn test_customers_have_no_cart() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let customer = app.account("customer@example.com", "Customer").await;

    let reply = app.add_to_cart(&customer, menu_item_id, 1, json!(100)).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quantity_changes_move_the_total() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let shopper = app.account("shopper@example.com", "User").await;

    app.add_to_cart(&shopper, menu_item_id, 2, json!("12.50")).await;
    app.add_to_cart(&shopper, menu_item_id, 1, json!(100)).await;

    let cart = app.get("/api/cart", &shopper.token).await.json();
    assert_eq!(cart["totalPrice"], "125.00");
    let line = cart["cartItems"][0]["cartItemId"].as_i64().unwrap();

    let reply = app
        .put(&format!("/api/cart/update/{line}"), &shopper.token, json!({ "quantity": 4 }))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["quantity"], 4);

    let cart = app.get("/api/cart", &shopper.token).await.json();
    assert_eq!(cart["totalPrice"], "150.00");

    let reply = app.delete(&format!("/api/cart/remove/{line}"), &shopper.token).await;
    assert_eq!(reply.status, StatusCode::OK);

    let cart = app.get("/api/cart", &shopper.token).await.json();
    assert_eq!(cart["totalPrice"], "100.00");
    assert_eq!(cart["cartItems"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_quantity_update_accepts_bare_integer() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let shopper = app.account("shopper@example.com", "User").await;

    app.add_to_cart(&shopper, menu_item_id, 1, json!(100)).await;
    let cart = app.get("/api/cart", &shopper.token).await.json();
    let uri = format!("/api/cart/update/{}", cart["cartItems"][0]["cartItemId"]);

    let bare = app.put(&uri, &shopper.token, json!(3)).await;
    assert_eq!(bare.status, StatusCode::OK);
    assert_eq!(bare.json()["quantity"], 3);

    let object = app.put(&uri, &shopper.token, json!({ "quantity": 2 })).await;
    assert_eq!(object.status, StatusCode::OK);
    assert_eq!(object.json()["quantity"], 2);

    let cart = app.get("/api/cart", &shopper.token).await.json();
    assert_eq!(cart["totalPrice"], "200.00");

    let zero = app.put(&uri, &shopper.token, json!(0)).await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_quantity() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let shopper = app.account("shopper@example.com", "User").await;

    let reply = app.add_to_cart(&shopper, menu_item_id, 0, json!(100)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.add_to_cart(&shopper, menu_item_id, 1, json!(-5)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let shopper = app.account("shopper@example.com", "User").await;

    assert_eq!(
        app.delete("/api/cart/clear", &shopper.token).await.status,
        StatusCode::NOT_FOUND
    );

    app.add_to_cart(&shopper, menu_item_id, 2, json!(100)).await;
    app.add_to_cart(&shopper, menu_item_id, 3, json!(100)).await;

    for _ in 0..2 {
        let reply = app.delete("/api/cart/clear", &shopper.token).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, "Cart cleared.");

        let cart = app.get("/api/cart", &shopper.token).await.json();
        assert_eq!(cart["totalPrice"], "0.00");
        assert!(cart["cartItems"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_cannot_touch_another_users_cart() {
    let app = spawn().await;
    let menu_item_id = with_menu_item(&app).await;
    let ada = app.account("ada@example.com", "User").await;
    let bob = app.account("bob@example.com", "User").await;

    app.add_to_cart(&ada, menu_item_id, 1, json!(100)).await;
    let cart = app.get("/api/cart", &ada.token).await.json();
    let line = cart["cartItems"][0]["cartItemId"].as_i64().unwrap();

    let update = app
        .put(&format!("/api/cart/update/{line}"), &bob.token, json!({ "quantity": 9 }))
        .await;
    assert_eq!(update.status, StatusCode::UNAUTHORIZED);

    let remove = app.delete(&format!("/api/cart/remove/{line}"), &bob.token).await;
    assert_eq!(remove.status, StatusCode::UNAUTHORIZED);

    let missing = app.delete("/api/cart/remove/999", &bob.token).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let cart = app.get("/api/cart", &ada.token).await.json();
    assert_eq!(cart["cartItems"][0]["quantity"], 1);
    assert_eq!(cart["totalPrice"], "100.00");
}

#[tokio::test]
async fn test_menu_item_delete_releases_cart_total() {
    let app = spawn().await;
    let admin = app.account("admin@example.com", "Admin").await;
    let restaurant_id = app.restaurant(&admin, None).await;
    let soup = app.menu_item(&admin, restaurant_id, json!(100)).await;
    let bread = app.menu_item(&admin, restaurant_id, json!(3)).await;
    let shopper = app.account("shopper@example.com", "User").await;

    app.add_to_cart(&shopper, soup, 2, json!(100)).await;
    app.add_to_cart(&shopper, bread, 1, json!(3)).await;

    let reply = app.delete(&format!("/api/menuitem/{soup}"), &admin.token).await;
    assert_eq!(reply.status, StatusCode::OK);

    let cart = app.get("/api/cart", &shopper.token).await.json();
    assert_eq!(cart["totalPrice"], "3.00");
    assert_eq!(cart["cartItems"].as_array().unwrap().len(), 1);
}
